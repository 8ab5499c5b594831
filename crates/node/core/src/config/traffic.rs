use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use siege_dispatch::DEFAULT_MAX_IN_FLIGHT;
use siege_traffic::{GasParams, HeartbeatParams, PayloadKind};
use siege_wire::MAX_BULK_TRANSACTION_SIZE;

const DEFAULT_CONCURRENCY: usize = 100;
const DEFAULT_ROUND_DELAY_MS: u64 = 1_000;
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
const DEFAULT_PUBLISH_ATTEMPTS: usize = 3;

/// What the fleet sends and how hard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub kinds: Vec<PayloadKind>,
    /// Payloads generated per kind and round, per peer.
    pub concurrency: usize,
    pub round_delay_ms: u64,
    pub shutdown_grace_secs: u64,
    /// Transfer value in whole tokens.
    pub amount: f64,
    pub gas: GasParams,
    pub heartbeat: HeartbeatParams,
    pub max_chunk_size: usize,
    pub max_in_flight: usize,
    /// Attempts per broadcast, including the first.
    pub publish_attempts: usize,
    pub data_file: Option<PathBuf>,
    pub receivers_file: Option<PathBuf>,
    pub wallets_dir: Option<PathBuf>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            kinds: vec![PayloadKind::Transactions],
            concurrency: DEFAULT_CONCURRENCY,
            round_delay_ms: DEFAULT_ROUND_DELAY_MS,
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
            amount: 1.0,
            gas: GasParams::default(),
            heartbeat: HeartbeatParams::default(),
            max_chunk_size: MAX_BULK_TRANSACTION_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            publish_attempts: DEFAULT_PUBLISH_ATTEMPTS,
            data_file: None,
            receivers_file: None,
            wallets_dir: None,
        }
    }
}

impl TrafficConfig {
    pub fn round_delay(&self) -> Duration {
        Duration::from_millis(self.round_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    pub fn sends(&self, kind: PayloadKind) -> bool {
        self.kinds.contains(&kind)
    }
}
