use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use siege_net_peer::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_CONNECTION_RETRIES, DEFAULT_MAX_TRANSMIT_SIZE,
    DEFAULT_RENDEZVOUS, DEFAULT_RETRY_DELAY,
};
use siege_orchestrator::{DEFAULT_BASE_PORT, DEFAULT_MAX_PORT, DEFAULT_PAGE_SIZE, DEFAULT_SETTLE};

const DEFAULT_PEERS: usize = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STATUS_INTERVAL_SECS: u64 = 30;

/// Fleet networking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interface every peer listens on.
    pub host: IpAddr,
    /// Ports are handed out from `base_port + 1`, wrapping at `max_port`.
    pub base_port: u16,
    pub max_port: u16,
    /// Seed node multiaddrs.
    pub bootnodes: Vec<String>,
    pub rendezvous: String,
    pub kad_protocol: String,
    pub max_transmit_size: usize,
    pub idle_timeout_secs: u64,
    /// Dial attempts per bootnode.
    pub connection_retries: usize,
    pub retry_delay_ms: u64,
    /// Bound on one peer's whole bootstrap.
    pub connect_timeout_secs: u64,
    pub peers: usize,
    /// Peers launched together.
    pub page_size: usize,
    pub settle_secs: u64,
    pub status_interval_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            base_port: DEFAULT_BASE_PORT,
            max_port: DEFAULT_MAX_PORT,
            bootnodes: Vec::new(),
            rendezvous: DEFAULT_RENDEZVOUS.to_string(),
            kad_protocol: DEFAULT_RENDEZVOUS.to_string(),
            max_transmit_size: DEFAULT_MAX_TRANSMIT_SIZE,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            connection_retries: DEFAULT_CONNECTION_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            peers: DEFAULT_PEERS,
            page_size: DEFAULT_PAGE_SIZE,
            settle_secs: DEFAULT_SETTLE.as_secs(),
            status_interval_secs: DEFAULT_STATUS_INTERVAL_SECS,
        }
    }
}

impl NetworkConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }
}
