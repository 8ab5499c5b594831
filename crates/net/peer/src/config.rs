use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use libp2p::Multiaddr;

/// Attempts per bootnode before giving up on it.
pub const DEFAULT_CONNECTION_RETRIES: usize = 50;

/// Pause between two attempts on the same bootnode.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Upper bound for the whole bootstrap of one peer.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(180);

/// Rendezvous key and Kademlia protocol of the target network.
pub const DEFAULT_RENDEZVOUS: &str = "/erd/kad/1.0.0";

/// Largest gossip message accepted or sent.
pub const DEFAULT_MAX_TRANSMIT_SIZE: usize = 2_145_728;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_COMMAND_BUFFER: usize = 256;

/// Settings for one peer's swarm.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Kademlia stream protocol.
    pub kad_protocol: String,
    /// Key under which peers advertise themselves on the DHT.
    pub rendezvous: String,
    pub max_transmit_size: usize,
    pub idle_timeout: Duration,
    /// Capacity of the command channel into the event loop.
    pub command_buffer: usize,
    pub agent_version: String,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            kad_protocol: DEFAULT_RENDEZVOUS.to_string(),
            rendezvous: DEFAULT_RENDEZVOUS.to_string(),
            max_transmit_size: DEFAULT_MAX_TRANSMIT_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            command_buffer: DEFAULT_COMMAND_BUFFER,
            agent_version: concat!("siege/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PeerConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }
}

/// How a peer reaches the network.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub bootnodes: Vec<Multiaddr>,
    pub retries: usize,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            bootnodes: Vec::new(),
            retries: DEFAULT_CONNECTION_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl BootstrapConfig {
    pub fn new(bootnodes: Vec<Multiaddr>) -> Self {
        Self {
            bootnodes,
            ..Default::default()
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
