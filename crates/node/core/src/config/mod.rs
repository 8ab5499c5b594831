//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments (applied after Figment load)
//! 2. Config file (TOML)
//! 3. Environment variables (`SIEGE_` prefix, `__` between sections)
//! 4. Defaults
//!
//! Sections:
//! - `network` - listen ports, seed nodes, paging
//! - `shards` - topology and the shards the fleet claims
//! - `topics` - which topics every peer joins
//! - `traffic` - payload kinds, volume and input files
//! - `account` - remote account API
//! - `identity` - key seeding

mod network;
mod traffic;

pub use network::NetworkConfig;
pub use traffic::TrafficConfig;

use std::{path::Path, sync::Arc, time::Duration};

use eyre::{Result, WrapErr, bail, ensure};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use siege_dispatch::{DispatchConfig, RetryPolicy};
use siege_net_peer::{BootstrapConfig, Multiaddr, PeerConfig};
use siege_orchestrator::{OrchestratorConfig, PortAllocator};
use siege_primitives::{ShardCoordinator, ShardId};
use siege_topics::{TopicName, TopicSelection};
use siege_traffic::{DEFAULT_NONCE_RETRIES, DEFAULT_NONCE_RETRY_DELAY, PayloadKind};
use tracing::debug;

use crate::{args::RunArgs, version::P2P_CLIENT_VERSION};

/// Network topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardsConfig {
    pub count: u32,
    /// Shards topics are generated for. Empty means every shard and the
    /// metachain.
    pub ids: Vec<ShardId>,
}

impl Default for ShardsConfig {
    fn default() -> Self {
        Self {
            count: 2,
            ids: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicsConfig {
    pub selection: TopicSelection,
    pub include_heartbeat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Account API base URLs. Without any, nonces start at 0.
    pub api_urls: Vec<String>,
    pub nonce_retries: usize,
    pub nonce_retry_delay_ms: u64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            api_urls: Vec::new(),
            nonce_retries: DEFAULT_NONCE_RETRIES,
            nonce_retry_delay_ms: DEFAULT_NONCE_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl AccountConfig {
    pub fn nonce_retry_delay(&self) -> Duration {
        Duration::from_millis(self.nonce_retry_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Seed for reproducible peer keys and traffic. Random when unset.
    pub seed: Option<String>,
}

/// Complete siege configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeConfig {
    pub network: NetworkConfig,
    pub shards: ShardsConfig,
    pub topics: TopicsConfig,
    pub traffic: TrafficConfig,
    pub account: AccountConfig,
    pub identity: IdentityConfig,
}

impl SiegeConfig {
    /// Load configuration from defaults, environment, and config file.
    /// CLI overrides should be applied separately after loading.
    ///
    /// A config path that does not exist is an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(SiegeConfig::default()))
            .merge(Env::prefixed("SIEGE_").split("__"));

        if let Some(path) = config_path {
            ensure!(path.exists(), "Config file {} does not exist", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment.extract().wrap_err("Failed to load configuration")
    }

    /// Load, apply CLI overrides, validate and freeze.
    pub fn resolve(args: &RunArgs) -> Result<Arc<Self>> {
        let mut config = Self::load(args.config.as_deref())?;
        config.apply_args(args);
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(Arc::new(config))
    }

    /// Apply command line arguments to override the configuration.
    pub fn apply_args(&mut self, args: &RunArgs) {
        if let Some(peers) = args.peers {
            self.network.peers = peers;
        }
        if let Some(port) = args.port {
            self.network.base_port = port;
        }
        if let Some(bootnodes) = &args.bootnodes {
            self.network.bootnodes = bootnodes.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.traffic.concurrency = concurrency;
        }
        if let Some(data) = &args.data {
            self.traffic.data_file = Some(data.clone());
        }
        if let Some(receivers) = &args.receivers {
            self.traffic.receivers_file = Some(receivers.clone());
        }
        if let Some(wallets) = &args.wallets {
            self.traffic.wallets_dir = Some(wallets.clone());
        }
        if let Some(seed) = &args.p2p_seed {
            self.identity.seed = Some(seed.clone());
        }
    }

    /// Check settings every command depends on.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.network.peers > 0, "network.peers must be at least 1");
        ensure!(self.network.page_size > 0, "network.page_size must be at least 1");
        ensure!(
            self.network.base_port < self.network.max_port,
            "network.base_port ({}) must be below network.max_port ({})",
            self.network.base_port,
            self.network.max_port
        );
        ensure!(
            self.traffic.concurrency > 0,
            "traffic.concurrency must be at least 1"
        );
        ensure!(
            self.traffic.max_in_flight > 0,
            "traffic.max_in_flight must be at least 1"
        );
        ensure!(
            self.traffic.max_chunk_size <= self.network.max_transmit_size,
            "traffic.max_chunk_size ({}) exceeds network.max_transmit_size ({})",
            self.traffic.max_chunk_size,
            self.network.max_transmit_size
        );
        self.bootnode_addrs()?;
        let shards = self.shard_ids()?;
        if let Some(shard) = self
            .traffic
            .heartbeat
            .shards
            .iter()
            .find(|shard| !shards.contains(shard))
        {
            bail!("traffic.heartbeat.shards names shard {shard}, which the fleet does not cover");
        }
        Ok(())
    }

    /// Check the inputs the enabled payload kinds need.
    pub fn validate_traffic(&self) -> Result<()> {
        let traffic = &self.traffic;
        ensure!(!traffic.kinds.is_empty(), "traffic.kinds is empty");
        if traffic.sends(PayloadKind::Transactions) && traffic.wallets_dir.is_none() {
            bail!("Transactions need a wallet directory (--wallets)");
        }
        if (traffic.sends(PayloadKind::Transactions) || traffic.sends(PayloadKind::Rewards))
            && traffic.receivers_file.is_none()
        {
            bail!("Transactions and rewards need a receiver file (--receivers)");
        }
        if traffic.sends(PayloadKind::Raw) && traffic.data_file.is_none() {
            bail!("Raw messages need a data file (--data)");
        }
        Ok(())
    }

    pub fn coordinator(&self) -> Result<ShardCoordinator> {
        ShardCoordinator::new(self.shards.count).wrap_err("Invalid shards.count")
    }

    /// The shards topics are generated for, each checked against the topology.
    pub fn shard_ids(&self) -> Result<Vec<ShardId>> {
        let coordinator = self.coordinator()?;
        if self.shards.ids.is_empty() {
            return Ok(coordinator.all_shards());
        }
        self.shards
            .ids
            .iter()
            .map(|shard| coordinator.validate(*shard).wrap_err("Invalid shards.ids"))
            .collect()
    }

    /// Topics every peer joins.
    pub fn topics(&self) -> Result<Vec<TopicName>> {
        let shards = self.shard_ids()?;
        Ok(self
            .topics
            .selection
            .resolve(&shards, self.topics.include_heartbeat))
    }

    pub fn bootnode_addrs(&self) -> Result<Vec<Multiaddr>> {
        self.network
            .bootnodes
            .iter()
            .map(|addr| {
                addr.parse::<Multiaddr>()
                    .wrap_err_with(|| format!("Invalid bootnode multiaddr {addr:?}"))
            })
            .collect()
    }

    pub fn peer_config(&self) -> PeerConfig {
        let network = &self.network;
        PeerConfig {
            host: network.host,
            port: 0,
            kad_protocol: network.kad_protocol.clone(),
            rendezvous: network.rendezvous.clone(),
            max_transmit_size: network.max_transmit_size,
            idle_timeout: network.idle_timeout(),
            agent_version: P2P_CLIENT_VERSION.to_string(),
            ..Default::default()
        }
    }

    pub fn bootstrap_config(&self) -> Result<BootstrapConfig> {
        Ok(BootstrapConfig::new(self.bootnode_addrs()?)
            .with_retries(self.network.connection_retries)
            .with_retry_delay(self.network.retry_delay())
            .with_timeout(self.network.connect_timeout()))
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            peer_count: self.network.peers,
            page_size: self.network.page_size,
            settle: self.network.settle(),
        }
    }

    pub fn port_allocator(&self) -> Result<PortAllocator> {
        PortAllocator::new(self.network.base_port, self.network.max_port)
            .wrap_err("Invalid port range")
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            max_chunk_size: self.traffic.max_chunk_size,
            max_in_flight: self.traffic.max_in_flight,
            retry: RetryPolicy {
                attempts: self.traffic.publish_attempts,
                ..Default::default()
            },
        }
    }
}
