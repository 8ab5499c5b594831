//! Gossip topic naming.
//!
//! Every shard-qualified channel is published on exactly one topic per
//! unordered pair of shards. [`topic`] implements the canonical naming rule,
//! [`generate_topics`] expands a shard list into the full topic catalogue and
//! [`TopicSelection`] decides which topics a peer joins.

pub mod channel;

mod catalog;
mod name;

pub use catalog::{TopicSelection, generate_topics};
pub use name::{TopicName, topic};
