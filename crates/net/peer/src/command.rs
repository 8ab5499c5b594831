use bytes::Bytes;
use libp2p::{Multiaddr, PeerId};
use siege_topics::TopicName;
use tokio::sync::oneshot;

use crate::PeerError;

/// Requests processed in order by the peer's event loop.
pub(crate) enum Command {
    Dial {
        addr: Multiaddr,
        reply: oneshot::Sender<Result<PeerId, PeerError>>,
    },
    JoinTopic {
        topic: TopicName,
        reply: oneshot::Sender<Result<JoinOutcome, PeerError>>,
    },
    Publish {
        topic: TopicName,
        data: Bytes,
        reply: oneshot::Sender<Result<(), PeerError>>,
    },
    Advertise,
    Status {
        reply: oneshot::Sender<PeerStatus>,
    },
    Shutdown,
}

/// Result of a topic join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
}

/// Connectivity snapshot of one peer.
#[derive(Debug, Clone)]
pub struct PeerStatus {
    pub peer_id: PeerId,
    pub bootstrapped: bool,
    pub listen_addrs: Vec<Multiaddr>,
    /// Remote addresses of live connections, sorted.
    pub remote_addrs: Vec<Multiaddr>,
    /// Joined topics, sorted by name.
    pub topics: Vec<TopicStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicStatus {
    pub topic: TopicName,
    pub mesh_peers: usize,
}
