use libp2p::{
    StreamProtocol, gossipsub, identify,
    identity::Keypair,
    kad::{self, store::MemoryStore},
    swarm::NetworkBehaviour,
};

use crate::{PeerConfig, PeerError};

const IDENTIFY_PROTOCOL: &str = "/siege/1.0.0";

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "PeerEvent")]
pub(crate) struct PeerBehaviour {
    pub(crate) identify: identify::Behaviour,
    pub(crate) gossipsub: gossipsub::Behaviour,
    pub(crate) kademlia: kad::Behaviour<MemoryStore>,
}

impl PeerBehaviour {
    pub(crate) fn new(keypair: &Keypair, config: &PeerConfig) -> Result<Self, PeerError> {
        let peer_id = keypair.public().to_peer_id();

        let identify = identify::Behaviour::new(
            identify::Config::new(IDENTIFY_PROTOCOL.to_string(), keypair.public())
                .with_agent_version(config.agent_version.clone()),
        );

        let gossipsub_config = gossipsub::ConfigBuilder::default()
            .max_transmit_size(config.max_transmit_size)
            .validation_mode(gossipsub::ValidationMode::Strict)
            .build()
            .map_err(|e| PeerError::Gossipsub(e.to_string()))?;
        let gossipsub = gossipsub::Behaviour::new(
            gossipsub::MessageAuthenticity::Signed(keypair.clone()),
            gossipsub_config,
        )
        .map_err(|e| PeerError::Gossipsub(e.to_string()))?;

        let protocol = StreamProtocol::try_from_owned(config.kad_protocol.clone())
            .map_err(|e| PeerError::Protocol(e.to_string()))?;
        let mut kademlia = kad::Behaviour::with_config(
            peer_id,
            MemoryStore::new(peer_id),
            kad::Config::new(protocol),
        );
        kademlia.set_mode(Some(kad::Mode::Server));

        Ok(Self {
            identify,
            gossipsub,
            kademlia,
        })
    }
}

pub(crate) enum PeerEvent {
    Identify(Box<identify::Event>),
    Gossipsub(Box<gossipsub::Event>),
    Kademlia(Box<kad::Event>),
}

impl From<identify::Event> for PeerEvent {
    fn from(event: identify::Event) -> Self {
        PeerEvent::Identify(Box::new(event))
    }
}

impl From<gossipsub::Event> for PeerEvent {
    fn from(event: gossipsub::Event) -> Self {
        PeerEvent::Gossipsub(Box::new(event))
    }
}

impl From<kad::Event> for PeerEvent {
    fn from(event: kad::Event) -> Self {
        PeerEvent::Kademlia(Box::new(event))
    }
}
