use std::{collections::BTreeMap, sync::Arc, time::Duration};

use bytes::Bytes;
use siege_primitives::ShardId;
use siege_topics::TopicName;
use siege_wire::{MAX_BULK_TRANSACTION_SIZE, pack_in_chunks};
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

use crate::{DispatchError, DispatchMetrics, Publisher, RetryPolicy, retry::publish_with_retry};

/// Default ceiling for concurrent publishes of one dispatcher.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Largest encoded chunk.
    pub max_chunk_size: usize,
    /// Publishes allowed in flight at once.
    pub max_in_flight: usize,
    pub retry: RetryPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: MAX_BULK_TRANSACTION_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Summary of one dispatch call.
///
/// Counts what was handed to broadcast tasks; the tasks report their own
/// failures through logs and metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Topics addressed.
    pub groups: usize,
    /// Messages spawned for broadcast.
    pub chunks: usize,
    /// Payloads carried by those messages.
    pub payloads: usize,
    /// Payloads refused because they exceed the chunk size.
    pub rejected: usize,
    /// Payloads dropped because their topic could not be joined.
    pub skipped: usize,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.groups += other.groups;
        self.chunks += other.chunks;
        self.payloads += other.payloads;
        self.rejected += other.rejected;
        self.skipped += other.skipped;
    }
}

/// Broadcasts payload batches through one peer.
pub struct BulkDispatcher<P> {
    publisher: P,
    config: DispatchConfig,
    permits: Arc<Semaphore>,
    metrics: DispatchMetrics,
}

impl<P: Publisher> BulkDispatcher<P> {
    pub fn new(publisher: P, mut config: DispatchConfig) -> Self {
        config.max_in_flight = config.max_in_flight.clamp(1, u32::MAX as usize);
        Self {
            publisher,
            permits: Arc::new(Semaphore::new(config.max_in_flight)),
            config,
            metrics: DispatchMetrics::default(),
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Broadcasts currently running.
    pub fn in_flight(&self) -> usize {
        self.config.max_in_flight - self.permits.available_permits()
    }

    /// Group `payloads` by destination shard and broadcast each group on the
    /// canonical `channel` topic between `own_shard` and that shard.
    pub async fn dispatch_routed(
        &self,
        own_shard: ShardId,
        channel: &str,
        payloads: Vec<(ShardId, Bytes)>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (shard, items) in partition(payloads) {
            let topic = siege_topics::topic(channel, own_shard, shard);
            if let Err(error) = self.ensure_joined(&topic).await {
                warn!(%shard, %error, "Skipping shard group");
                report.skipped += items.len();
                continue;
            }
            report.groups += 1;

            let packed = pack_in_chunks(items, self.config.max_chunk_size);
            for rejected in &packed.rejected {
                warn!(%topic, %shard, %rejected, "Payload rejected");
            }
            report.rejected += packed.rejected.len();
            self.metrics.add_rejected(packed.rejected.len());

            for chunk in packed.chunks {
                report.chunks += 1;
                report.payloads += chunk.items();
                self.spawn_broadcast(topic.clone(), Some(shard), chunk.into_bytes())
                    .await;
            }
        }

        debug!(
            groups = report.groups,
            chunks = report.chunks,
            payloads = report.payloads,
            "Dispatched routed batch"
        );
        report
    }

    /// Broadcast every item as its own message on `topic`.
    pub async fn broadcast_each(&self, topic: &TopicName, items: Vec<Bytes>) -> DispatchReport {
        let mut report = DispatchReport::default();
        if let Err(error) = self.ensure_joined(topic).await {
            warn!(%error, "Skipping broadcast");
            report.skipped = items.len();
            return report;
        }
        report.groups = 1;

        for item in items {
            if item.len() > self.config.max_chunk_size {
                warn!(%topic, size = item.len(), limit = self.config.max_chunk_size, "Payload rejected");
                report.rejected += 1;
                self.metrics.add_rejected(1);
                continue;
            }
            report.chunks += 1;
            report.payloads += 1;
            self.spawn_broadcast(topic.clone(), None, item).await;
        }
        report
    }

    /// Wait for every in-flight broadcast, at most `grace`.
    ///
    /// Returns `false` when broadcasts were still running at the deadline.
    pub async fn drain(&self, grace: Duration) -> bool {
        let total = self.config.max_in_flight as u32;
        match tokio::time::timeout(grace, self.permits.acquire_many(total)).await {
            Ok(Ok(_permits)) => true,
            Ok(Err(_)) | Err(_) => false,
        }
    }

    async fn ensure_joined(&self, topic: &TopicName) -> Result<(), DispatchError> {
        self.publisher
            .join_topic(topic)
            .await
            .map(|_| ())
            .map_err(|source| DispatchError::Join {
                topic: topic.clone(),
                source,
            })
    }

    /// Wait for a permit, then publish `data` from a new task.
    async fn spawn_broadcast(&self, topic: TopicName, shard: Option<ShardId>, data: Bytes) {
        let Ok(permit) = self.permits.clone().acquire_owned().await else {
            return;
        };

        let publisher = self.publisher.clone();
        let policy = self.config.retry.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let _finished = metrics.finish_guard();
            let size = data.len();
            match publish_with_retry(&publisher, &topic, data, &policy, &metrics).await {
                Ok(()) => {
                    metrics.inc_published();
                    trace!(%topic, ?shard, size, "Broadcast sent");
                }
                Err(error) => {
                    metrics.inc_failures();
                    warn!(?shard, size, %error, "Broadcast failed");
                }
            }
        });
    }
}

/// Group payloads by shard, keeping their order inside each group.
pub(crate) fn partition(payloads: Vec<(ShardId, Bytes)>) -> BTreeMap<ShardId, Vec<Bytes>> {
    let mut groups: BTreeMap<ShardId, Vec<Bytes>> = BTreeMap::new();
    for (shard, bytes) in payloads {
        groups.entry(shard).or_default().push(bytes);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keeps_order_within_a_shard() {
        let payloads = vec![
            (ShardId::new(1), Bytes::from_static(b"a")),
            (ShardId::META, Bytes::from_static(b"b")),
            (ShardId::new(1), Bytes::from_static(b"c")),
            (ShardId::new(0), Bytes::from_static(b"d")),
        ];
        let groups = partition(payloads);

        assert_eq!(
            groups.keys().copied().collect::<Vec<_>>(),
            vec![ShardId::new(0), ShardId::new(1), ShardId::META]
        );
        assert_eq!(
            groups[&ShardId::new(1)],
            vec![Bytes::from_static(b"a"), Bytes::from_static(b"c")]
        );
    }

    #[test]
    fn reports_merge() {
        let mut total = DispatchReport {
            groups: 1,
            chunks: 2,
            payloads: 3,
            rejected: 0,
            skipped: 1,
        };
        total.merge(DispatchReport {
            groups: 1,
            chunks: 1,
            payloads: 1,
            rejected: 1,
            skipped: 0,
        });
        assert_eq!(total.chunks, 3);
        assert_eq!(total.rejected, 1);
        assert_eq!(total.skipped, 1);
    }
}
