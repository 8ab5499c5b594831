use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use siege_primitives::ShardId;

use crate::{TopicName, channel, topic};

/// Expand `shards` into every topic of the sharded channels.
///
/// For each channel and each shard `S` this yields the self topic followed by
/// the [`topic`] of `S` and every other shard, in list order, each name once.
/// Block bodies are shared by all shards and only produce `txBlockBodies_ALL`.
pub fn generate_topics(shards: &[ShardId]) -> Vec<TopicName> {
    let mut seen = HashSet::new();
    let mut topics = Vec::new();
    for base in channel::SHARDED {
        if base == channel::TX_BLOCK_BODIES {
            topics.push(TopicName::new(format!("{base}_{}", channel::ALL_SUFFIX)));
            continue;
        }
        for &shard in shards {
            let others = shards.iter().copied().filter(|other| *other != shard);
            for other in std::iter::once(shard).chain(others) {
                let name = topic(base, shard, other);
                if seen.insert(name.clone()) {
                    topics.push(name);
                }
            }
        }
    }
    topics
}

/// Which topics each peer joins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TopicSelection {
    /// Every topic produced by [`generate_topics`] for the configured shards.
    #[default]
    Generated,
    /// An explicit list.
    Static { topics: Vec<TopicName> },
}

impl TopicSelection {
    /// Resolve the selection into a deduplicated, ordered topic list.
    pub fn resolve(&self, shards: &[ShardId], include_heartbeat: bool) -> Vec<TopicName> {
        let candidates = match self {
            Self::Generated => generate_topics(shards),
            Self::Static { topics } => topics.clone(),
        };
        let heartbeat = include_heartbeat.then(|| TopicName::from(channel::HEARTBEAT));

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .chain(heartbeat)
            .filter(|topic| seen.insert(topic.clone()))
            .collect()
    }
}
