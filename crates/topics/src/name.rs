use std::fmt;

use serde::{Deserialize, Serialize};
use siege_primitives::ShardId;

/// Name of a gossip topic.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicName(String);

impl TopicName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicName({})", self.0)
    }
}

impl AsRef<str> for TopicName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TopicName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TopicName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Canonical topic for traffic on `channel` between `sender` and `receiver`.
///
/// The result does not depend on direction: `topic(c, a, b) == topic(c, b, a)`.
/// Intra-shard traffic carries a single shard suffix, traffic involving the
/// metachain always ends in `_META`, and any other pair is ordered ascending.
pub fn topic(channel: &str, sender: ShardId, receiver: ShardId) -> TopicName {
    let name = if sender == receiver {
        format!("{channel}_{sender}")
    } else if receiver.is_meta() {
        format!("{channel}_{sender}_META")
    } else if sender.is_meta() {
        format!("{channel}_{receiver}_META")
    } else {
        let (low, high) = if sender < receiver {
            (sender, receiver)
        } else {
            (receiver, sender)
        };
        format!("{channel}_{low}_{high}")
    };
    TopicName(name)
}
