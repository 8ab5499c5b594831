//! Forged validator heartbeats.

use bytes::Bytes;
use ed25519_dalek::{Signer, SigningKey};
use prost::Message;
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use siege_primitives::ShardId;
use siege_wire::proto::Heartbeat;

use crate::PayloadError;

pub const DEFAULT_VERSION: &str = "v1.0.131-0-gc00596aae/go1.13.5/linux-amd64";
pub const DEFAULT_NAME_PREFIX: &str = "validator";

/// Display names end with a number drawn from this range.
const VALIDATOR_NUMBERS: std::ops::RangeInclusive<u32> = 1..=6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatParams {
    /// Shards a heartbeat may claim to come from.
    pub shards: Vec<ShardId>,
    pub version: String,
    pub name_prefix: String,
    pub identity: String,
    /// Random bytes in the payload, before hex encoding.
    pub payload_len: usize,
}

impl Default for HeartbeatParams {
    fn default() -> Self {
        Self {
            shards: vec![ShardId::META, ShardId::new(0)],
            version: DEFAULT_VERSION.to_string(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            identity: String::new(),
            payload_len: 16,
        }
    }
}

/// Build a heartbeat for the peer `pid`, signed by a throwaway key.
pub fn build_heartbeat<R: Rng>(
    params: &HeartbeatParams,
    pid: &[u8],
    rng: &mut R,
) -> Result<Bytes, PayloadError> {
    let shard = params.shards.choose(rng).ok_or(PayloadError::NoShards)?;

    let mut payload = vec![0u8; params.payload_len];
    rng.fill_bytes(&mut payload);

    let mut secret = [0u8; 32];
    rng.fill_bytes(&mut secret);
    let key = SigningKey::from_bytes(&secret);

    let mut heartbeat = Heartbeat {
        payload: hex::encode(payload).into_bytes(),
        pubkey: key.verifying_key().to_bytes().to_vec(),
        signature: Vec::new(),
        shard_id: shard.get(),
        version_number: params.version.clone(),
        node_display_name: format!(
            "{}-{}",
            params.name_prefix,
            rng.random_range(VALIDATOR_NUMBERS)
        ),
        identity: params.identity.clone(),
        pid: pid.to_vec(),
    };
    heartbeat.signature = key.sign(&heartbeat.encode_to_vec()).to_bytes().to_vec();

    Ok(Bytes::from(heartbeat.encode_to_vec()))
}
