use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use libp2p::{Multiaddr, PeerId, SwarmBuilder, multiaddr::Protocol, noise, tcp, yamux};
use siege_identity::PeerIdentity;
use siege_topics::TopicName;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    JoinOutcome, PeerConfig, PeerError, PeerStatus, behaviour::PeerBehaviour, command::Command,
    driver::PeerDriver,
};

/// Build a peer's swarm, start listening and spawn its event loop.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_peer(
    index: usize,
    identity: PeerIdentity,
    config: &PeerConfig,
) -> Result<PeerHandle, PeerError> {
    let behaviour = PeerBehaviour::new(identity.keypair(), config)?;
    let idle_timeout = config.idle_timeout;

    let mut swarm = SwarmBuilder::with_existing_identity(identity.keypair().clone())
        .with_tokio()
        .with_tcp(
            tcp::Config::default(),
            noise::Config::new,
            yamux::Config::default,
        )
        .map_err(|e| PeerError::Transport(e.to_string()))?
        .with_dns()
        .map_err(|e| PeerError::Transport(e.to_string()))?
        .with_behaviour(move |_| behaviour)
        .map_err(|e| PeerError::Transport(e.to_string()))?
        .with_swarm_config(|cfg| cfg.with_idle_connection_timeout(idle_timeout))
        .build();

    let addr = Multiaddr::empty()
        .with(Protocol::from(config.host))
        .with(Protocol::Tcp(config.port));
    swarm
        .listen_on(addr.clone())
        .map_err(|e| PeerError::Listen {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

    let peer_id = identity.peer_id();
    info!(index, %peer_id, %addr, "Peer started");

    let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
    tokio::spawn(PeerDriver::new(swarm, rx, &config.rendezvous).run());

    Ok(PeerHandle {
        inner: Arc::new(HandleInner {
            index,
            port: config.port,
            peer_id,
            commands: tx,
            bootstrapped: AtomicBool::new(false),
        }),
    })
}

struct HandleInner {
    index: usize,
    port: u16,
    peer_id: PeerId,
    commands: mpsc::Sender<Command>,
    bootstrapped: AtomicBool,
}

/// Cloneable handle to a running peer.
///
/// Requests are queued on the peer's event loop and answered in order. The
/// event loop stops on [`PeerHandle::close`] or once every handle is dropped.
#[derive(Clone)]
pub struct PeerHandle {
    inner: Arc<HandleInner>,
}

impl PeerHandle {
    /// Fleet slot this peer occupies.
    pub fn index(&self) -> usize {
        self.inner.index
    }

    pub fn port(&self) -> u16 {
        self.inner.port
    }

    pub fn peer_id(&self) -> PeerId {
        self.inner.peer_id
    }

    /// Whether the peer reached at least one bootnode.
    pub fn is_bootstrapped(&self) -> bool {
        self.inner.bootstrapped.load(Ordering::Acquire)
    }

    pub(crate) fn mark_bootstrapped(&self) {
        self.inner.bootstrapped.store(true, Ordering::Release);
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, PeerError> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .commands
            .send(build(tx))
            .await
            .map_err(|_| PeerError::Closed)?;
        rx.await.map_err(|_| PeerError::Closed)
    }

    /// Dial `addr`, resolving once the connection is established or has failed.
    pub async fn dial(&self, addr: Multiaddr) -> Result<PeerId, PeerError> {
        self.request(|reply| Command::Dial { addr, reply }).await?
    }

    /// Subscribe to `topic` unless already subscribed.
    pub async fn join_topic(&self, topic: &TopicName) -> Result<JoinOutcome, PeerError> {
        let topic = topic.clone();
        self.request(|reply| Command::JoinTopic { topic, reply })
            .await?
    }

    /// Join every topic, logging failures. Returns how many are joined.
    pub async fn join_topics(&self, topics: &[TopicName]) -> usize {
        let mut joined = 0;
        for topic in topics {
            match self.join_topic(topic).await {
                Ok(_) => joined += 1,
                Err(error) => {
                    warn!(peer_id = %self.peer_id(), %topic, %error, "Failed to join topic")
                }
            }
        }
        joined
    }

    /// Publish `data` on a joined topic.
    pub async fn publish(&self, topic: &TopicName, data: Bytes) -> Result<(), PeerError> {
        let topic = topic.clone();
        self.request(|reply| Command::Publish { topic, data, reply })
            .await?
    }

    /// Advertise on the rendezvous key and dial discovered providers.
    pub async fn advertise(&self) -> Result<(), PeerError> {
        self.inner
            .commands
            .send(Command::Advertise)
            .await
            .map_err(|_| PeerError::Closed)
    }

    pub async fn status(&self) -> Result<PeerStatus, PeerError> {
        let mut status = self.request(|reply| Command::Status { reply }).await?;
        status.bootstrapped = self.is_bootstrapped();
        Ok(status)
    }

    /// Stop the peer's event loop. Further requests fail with [`PeerError::Closed`].
    pub async fn close(&self) {
        if self.inner.commands.send(Command::Shutdown).await.is_err() {
            debug!(peer_id = %self.peer_id(), "Peer already stopped");
        }
    }
}

impl std::fmt::Debug for PeerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerHandle")
            .field("index", &self.inner.index)
            .field("peer_id", &self.inner.peer_id)
            .field("port", &self.inner.port)
            .finish()
    }
}
