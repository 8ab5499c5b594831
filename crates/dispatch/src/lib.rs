//! Bulk broadcast engine.
//!
//! [`BulkDispatcher`] turns payload batches into gossip messages: routed
//! payloads are grouped by destination shard, packed into size-bounded
//! chunks and published on the canonical topic for each shard pair. Every
//! chunk is published from its own task, gated by a semaphore so that at
//! most `max_in_flight` publishes run at once. Failures stay local to the
//! chunk that produced them.

mod engine;
mod error;
mod metrics;
mod publisher;
mod retry;

pub use engine::{BulkDispatcher, DEFAULT_MAX_IN_FLIGHT, DispatchConfig, DispatchReport};
pub use error::DispatchError;
pub use metrics::DispatchMetrics;
pub use publisher::Publisher;
pub use retry::RetryPolicy;
