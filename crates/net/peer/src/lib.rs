//! Runtime for a single fleet peer.
//!
//! [`spawn_peer`] builds a libp2p swarm (TCP, noise, yamux, DNS) running
//! gossipsub, identify and Kademlia, and moves it into its own event-loop
//! task. That task is the only owner of the swarm, of the joined-topic map and
//! of the live remote addresses; everything else talks to it through a
//! cloneable [`PeerHandle`].
//!
//! [`bootstrap`] connects a fresh peer to the configured seed nodes.

mod behaviour;
mod bootstrap;
mod command;
mod config;
mod driver;
mod error;
mod handle;

pub use bootstrap::bootstrap;
pub use command::{JoinOutcome, PeerStatus, TopicStatus};
pub use config::{
    BootstrapConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONNECTION_RETRIES,
    DEFAULT_MAX_TRANSMIT_SIZE, DEFAULT_RENDEZVOUS, DEFAULT_RETRY_DELAY, PeerConfig,
};
pub use error::{PeerError, PublishFailure};
pub use handle::{PeerHandle, spawn_peer};

pub use libp2p::{Multiaddr, PeerId};
