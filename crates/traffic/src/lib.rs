//! Synthetic traffic.
//!
//! Builders for the payloads the fleet floods the network with, and the
//! [`TrafficRunner`] that generates them round after round for one peer:
//!
//! - [`TransferBuilder`] - signed transfers from a loaded [`Wallet`], with
//!   nonces handed out by a shared [`NonceTracker`]
//! - [`build_heartbeat`] - validator heartbeats signed by throwaway keys
//! - [`build_reward`] and [`bundle_rewards`] - metachain reward transactions
//!   grouped into mini-blocks per receiving shard

mod account;
mod error;
mod heartbeat;
mod nonce;
mod reward;
mod runner;
mod transfer;
mod wallet;

pub use account::{AccountError, AccountInfo, AccountProvider, HttpAccountClient, OfflineAccounts};
pub use error::PayloadError;
pub use heartbeat::{DEFAULT_NAME_PREFIX, DEFAULT_VERSION, HeartbeatParams, build_heartbeat};
pub use nonce::{DEFAULT_NONCE_RETRIES, DEFAULT_NONCE_RETRY_DELAY, NonceTracker};
pub use reward::{EconomicsSnapshot, Reward, RewardBundle, build_reward, bundle_rewards};
pub use runner::{PayloadKind, TrafficPlan, TrafficRunner, WalletSlot, runner_rng};
pub use transfer::{
    DEFAULT_GAS_LIMIT, DEFAULT_GAS_PRICE, DENOMINATION, GasParams, Transfer, TransferBuilder,
};
pub use wallet::{Wallet, WalletError};
