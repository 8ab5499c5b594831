use std::collections::HashMap;

use futures::StreamExt;
use libp2p::{
    Multiaddr, PeerId, Swarm, gossipsub, identify, kad,
    multiaddr::Protocol,
    swarm::{ConnectionId, SwarmEvent, dial_opts::DialOpts},
};
use siege_topics::TopicName;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::{
    JoinOutcome, PeerError, PeerStatus, PublishFailure, TopicStatus,
    behaviour::{PeerBehaviour, PeerEvent},
    command::Command,
};

type DialReply = oneshot::Sender<Result<PeerId, PeerError>>;

/// Event loop owning one peer's swarm.
pub(crate) struct PeerDriver {
    swarm: Swarm<PeerBehaviour>,
    commands: mpsc::Receiver<Command>,
    topics: HashMap<TopicName, gossipsub::TopicHash>,
    pending_dials: HashMap<ConnectionId, DialReply>,
    remotes: HashMap<PeerId, Multiaddr>,
    rendezvous: kad::RecordKey,
}

impl PeerDriver {
    pub(crate) fn new(
        swarm: Swarm<PeerBehaviour>,
        commands: mpsc::Receiver<Command>,
        rendezvous: &str,
    ) -> Self {
        Self {
            swarm,
            commands,
            topics: HashMap::new(),
            pending_dials: HashMap::new(),
            remotes: HashMap::new(),
            rendezvous: kad::RecordKey::new(&rendezvous),
        }
    }

    /// Run until a shutdown command arrives or every handle is dropped.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.swarm.select_next_some() => self.on_swarm_event(event),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.on_command(command),
                },
            }
        }
        debug!(peer_id = %self.swarm.local_peer_id(), "Peer event loop stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Dial { addr, reply } => self.dial(addr, reply),
            Command::JoinTopic { topic, reply } => {
                let _ = reply.send(self.join_topic(topic));
            }
            Command::Publish { topic, data, reply } => {
                let _ = reply.send(self.publish(topic, data.into()));
            }
            Command::Advertise => self.advertise(),
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown => {}
        }
    }

    fn dial(&mut self, addr: Multiaddr, reply: DialReply) {
        if let Some(Protocol::P2p(peer_id)) = addr.iter().last() {
            self.swarm
                .behaviour_mut()
                .kademlia
                .add_address(&peer_id, addr.clone());
        }

        let opts = DialOpts::from(addr);
        let connection_id = opts.connection_id();
        match self.swarm.dial(opts) {
            Ok(()) => {
                self.pending_dials.insert(connection_id, reply);
            }
            Err(error) => {
                let _ = reply.send(Err(PeerError::Dial(error.to_string())));
            }
        }
    }

    fn join_topic(&mut self, topic: TopicName) -> Result<JoinOutcome, PeerError> {
        if self.topics.contains_key(&topic) {
            return Ok(JoinOutcome::AlreadyJoined);
        }
        let ident = gossipsub::IdentTopic::new(topic.as_str());
        self.swarm
            .behaviour_mut()
            .gossipsub
            .subscribe(&ident)
            .map_err(|e| PeerError::Subscribe {
                topic: topic.clone(),
                reason: e.to_string(),
            })?;
        trace!(%topic, "Joined topic");
        self.topics.insert(topic, ident.hash());
        Ok(JoinOutcome::Joined)
    }

    fn publish(&mut self, topic: TopicName, data: Vec<u8>) -> Result<(), PeerError> {
        let Some(hash) = self.topics.get(&topic).cloned() else {
            return Err(PeerError::NotJoined(topic));
        };
        self.swarm
            .behaviour_mut()
            .gossipsub
            .publish(hash, data)
            .map(|_| ())
            .map_err(|e| PeerError::Publish {
                topic,
                failure: PublishFailure::from(e),
            })
    }

    /// Announce ourselves under the rendezvous key and look for other providers.
    fn advertise(&mut self) {
        let kademlia = &mut self.swarm.behaviour_mut().kademlia;
        if let Err(error) = kademlia.start_providing(self.rendezvous.clone()) {
            debug!(%error, "Failed to store rendezvous record");
        }
        kademlia.get_providers(self.rendezvous.clone());
        if let Err(error) = kademlia.bootstrap() {
            debug!(%error, "Kademlia bootstrap skipped");
        }
    }

    fn status(&self) -> PeerStatus {
        let gossipsub = &self.swarm.behaviour().gossipsub;

        let mut topics: Vec<TopicStatus> = self
            .topics
            .iter()
            .map(|(topic, hash)| TopicStatus {
                topic: topic.clone(),
                mesh_peers: gossipsub.mesh_peers(hash).count(),
            })
            .collect();
        topics.sort_by(|a, b| a.topic.cmp(&b.topic));

        let mut remote_addrs: Vec<Multiaddr> = self.remotes.values().cloned().collect();
        remote_addrs.sort_by_cached_key(ToString::to_string);

        PeerStatus {
            peer_id: *self.swarm.local_peer_id(),
            bootstrapped: false,
            listen_addrs: self.swarm.listeners().cloned().collect(),
            remote_addrs,
            topics,
        }
    }

    fn on_swarm_event(&mut self, event: SwarmEvent<PeerEvent>) {
        match event {
            SwarmEvent::NewListenAddr { address, .. } => {
                debug!(%address, "Listening on address");
            }
            SwarmEvent::ConnectionEstablished {
                peer_id,
                connection_id,
                endpoint,
                ..
            } => {
                let remote = endpoint.get_remote_address().clone();
                trace!(%peer_id, %remote, "Connection established");
                if endpoint.is_dialer() {
                    self.swarm
                        .behaviour_mut()
                        .kademlia
                        .add_address(&peer_id, remote.clone());
                }
                self.remotes.insert(peer_id, remote);
                if let Some(reply) = self.pending_dials.remove(&connection_id) {
                    let _ = reply.send(Ok(peer_id));
                }
            }
            SwarmEvent::OutgoingConnectionError {
                connection_id,
                peer_id,
                error,
            } => {
                trace!(?peer_id, %error, "Outgoing connection failed");
                if let Some(reply) = self.pending_dials.remove(&connection_id) {
                    let _ = reply.send(Err(PeerError::Dial(error.to_string())));
                }
            }
            SwarmEvent::ConnectionClosed {
                peer_id,
                num_established,
                ..
            } => {
                if num_established == 0 {
                    self.remotes.remove(&peer_id);
                }
            }
            SwarmEvent::Behaviour(event) => self.on_behaviour_event(event),
            _ => {}
        }
    }

    fn on_behaviour_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::Identify(event) => self.on_identify_event(*event),
            PeerEvent::Gossipsub(event) => Self::on_gossipsub_event(*event),
            PeerEvent::Kademlia(event) => self.on_kademlia_event(*event),
        }
    }

    fn on_identify_event(&mut self, event: identify::Event) {
        if let identify::Event::Received { peer_id, info, .. } = event {
            trace!(%peer_id, agent_version = %info.agent_version, "Received identify info");
            let kademlia = &mut self.swarm.behaviour_mut().kademlia;
            for addr in info.listen_addrs {
                kademlia.add_address(&peer_id, addr);
            }
        }
    }

    fn on_gossipsub_event(event: gossipsub::Event) {
        match event {
            gossipsub::Event::Subscribed { peer_id, topic } => {
                trace!(%peer_id, %topic, "Remote peer subscribed");
            }
            gossipsub::Event::Unsubscribed { peer_id, topic } => {
                trace!(%peer_id, %topic, "Remote peer unsubscribed");
            }
            _ => {}
        }
    }

    fn on_kademlia_event(&mut self, event: kad::Event) {
        let kad::Event::OutboundQueryProgressed { result, .. } = event else {
            return;
        };
        match result {
            kad::QueryResult::GetProviders(Ok(kad::GetProvidersOk::FoundProviders {
                providers,
                ..
            })) => {
                let local = *self.swarm.local_peer_id();
                for provider in providers {
                    if provider == local || self.swarm.is_connected(&provider) {
                        continue;
                    }
                    debug!(%provider, "Found rendezvous provider");
                    if let Err(error) = self.swarm.dial(provider) {
                        debug!(%provider, %error, "Failed to dial rendezvous provider");
                    }
                }
            }
            kad::QueryResult::GetProviders(Err(error)) => {
                debug!(%error, "Rendezvous lookup failed");
            }
            kad::QueryResult::StartProviding(Err(error)) => {
                debug!(%error, "Rendezvous advertisement failed");
            }
            kad::QueryResult::Bootstrap(Err(error)) => {
                debug!(%error, "Kademlia bootstrap failed");
            }
            _ => {}
        }
    }
}
