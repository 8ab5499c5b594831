//! Dispatcher behaviour against a recording publisher.

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use bytes::Bytes;
use prost::Message;
use siege_dispatch::{BulkDispatcher, DispatchConfig, Publisher, RetryPolicy};
use siege_net_peer::{JoinOutcome, PeerError, PublishFailure};
use siege_primitives::ShardId;
use siege_topics::{TopicName, channel};
use siege_wire::proto::Batch;

#[derive(Default)]
struct Recorder {
    joined: Mutex<Vec<TopicName>>,
    published: Mutex<Vec<(TopicName, Bytes)>>,
    refused: Mutex<HashSet<TopicName>>,
    transient_failures: AtomicUsize,
    attempts: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    delay: Mutex<Duration>,
}

#[derive(Clone, Default)]
struct RecordingPublisher(Arc<Recorder>);

impl RecordingPublisher {
    fn refuse(&self, topic: &str) {
        self.0.refused.lock().unwrap().insert(topic.into());
    }

    fn fail_next(&self, count: usize) {
        self.0.transient_failures.store(count, Ordering::SeqCst);
    }

    fn with_delay(self, delay: Duration) -> Self {
        *self.0.delay.lock().unwrap() = delay;
        self
    }

    fn joined(&self) -> Vec<TopicName> {
        self.0.joined.lock().unwrap().clone()
    }

    fn published(&self) -> Vec<(TopicName, Bytes)> {
        self.0.published.lock().unwrap().clone()
    }

    fn items_on(&self, topic: &str) -> Vec<Vec<u8>> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t.as_str() == topic)
            .flat_map(|(_, bytes)| Batch::decode(bytes).unwrap().data)
            .collect()
    }
}

impl Publisher for RecordingPublisher {
    async fn join_topic(&self, topic: &TopicName) -> Result<JoinOutcome, PeerError> {
        if self.0.refused.lock().unwrap().contains(topic) {
            return Err(PeerError::Subscribe {
                topic: topic.clone(),
                reason: "refused".into(),
            });
        }
        let mut joined = self.0.joined.lock().unwrap();
        if joined.contains(topic) {
            Ok(JoinOutcome::AlreadyJoined)
        } else {
            joined.push(topic.clone());
            Ok(JoinOutcome::Joined)
        }
    }

    async fn publish(&self, topic: &TopicName, data: Bytes) -> Result<(), PeerError> {
        self.0.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.0.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.peak.fetch_max(now, Ordering::SeqCst);
        let delay = *self.0.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.0.active.fetch_sub(1, Ordering::SeqCst);

        let failing = self
            .0
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PeerError::Publish {
                topic: topic.clone(),
                failure: PublishFailure::Transient("no peers subscribed".into()),
            });
        }
        self.0
            .published
            .lock()
            .unwrap()
            .push((topic.clone(), data));
        Ok(())
    }
}

fn payload(tag: u8, len: usize) -> Bytes {
    Bytes::from(vec![tag; len])
}

fn config() -> DispatchConfig {
    DispatchConfig {
        retry: RetryPolicy {
            attempts: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(100),
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn routes_every_shard_to_its_canonical_topic() {
    let publisher = RecordingPublisher::default();
    let dispatcher = BulkDispatcher::new(publisher.clone(), config());

    let payloads = vec![
        (ShardId::new(1), payload(1, 8)),
        (ShardId::new(0), payload(2, 8)),
        (ShardId::META, payload(3, 8)),
        (ShardId::new(1), payload(4, 8)),
    ];
    let report = dispatcher
        .dispatch_routed(ShardId::new(0), channel::TRANSACTIONS, payloads)
        .await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(report.groups, 3);
    assert_eq!(report.payloads, 4);
    let joined: HashSet<String> = publisher
        .joined()
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    assert_eq!(
        joined,
        HashSet::from([
            "transactions_0".to_string(),
            "transactions_0_1".to_string(),
            "transactions_0_META".to_string(),
        ])
    );
    assert_eq!(
        publisher.items_on("transactions_0_1"),
        vec![vec![1u8; 8], vec![4u8; 8]]
    );
    assert_eq!(publisher.items_on("transactions_0_META"), vec![vec![3u8; 8]]);
}

#[tokio::test]
async fn chunks_stay_within_the_size_limit() {
    let publisher = RecordingPublisher::default();
    let dispatcher = BulkDispatcher::new(
        publisher.clone(),
        DispatchConfig {
            max_chunk_size: 250,
            ..config()
        },
    );

    // 100-byte payloads cost 102 encoded bytes, so two fit per chunk.
    let payloads: Vec<_> = (0..10).map(|i| (ShardId::new(0), payload(i, 100))).collect();
    let report = dispatcher
        .dispatch_routed(ShardId::new(0), channel::TRANSACTIONS, payloads)
        .await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(report.chunks, 5);
    let published = publisher.published();
    assert!(published.iter().all(|(_, bytes)| bytes.len() <= 250));
    let mut tags: Vec<u8> = publisher
        .items_on("transactions_0")
        .into_iter()
        .map(|item| item[0])
        .collect();
    tags.sort_unstable();
    assert_eq!(tags, (0..10).collect::<Vec<u8>>());
}

#[tokio::test]
async fn join_failure_skips_only_that_group() {
    let publisher = RecordingPublisher::default();
    publisher.refuse("transactions_0_1");
    let dispatcher = BulkDispatcher::new(publisher.clone(), config());

    let payloads = vec![
        (ShardId::new(1), payload(1, 8)),
        (ShardId::new(0), payload(2, 8)),
    ];
    let report = dispatcher
        .dispatch_routed(ShardId::new(0), channel::TRANSACTIONS, payloads)
        .await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(report.skipped, 1);
    assert_eq!(report.groups, 1);
    assert_eq!(publisher.items_on("transactions_0"), vec![vec![2u8; 8]]);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried() {
    let publisher = RecordingPublisher::default();
    publisher.fail_next(2);
    let dispatcher = BulkDispatcher::new(publisher.clone(), config());

    let topic = TopicName::from(channel::HEARTBEAT);
    dispatcher.broadcast_each(&topic, vec![payload(9, 4)]).await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(publisher.0.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(publisher.published().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn retries_are_bounded() {
    let publisher = RecordingPublisher::default();
    publisher.fail_next(10);
    let dispatcher = BulkDispatcher::new(publisher.clone(), config());

    let topic = TopicName::from(channel::HEARTBEAT);
    dispatcher.broadcast_each(&topic, vec![payload(9, 4)]).await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(publisher.0.attempts.load(Ordering::SeqCst), 3);
    assert!(publisher.published().is_empty());
}

#[tokio::test(start_paused = true)]
async fn in_flight_publishes_are_bounded() {
    let publisher = RecordingPublisher::default().with_delay(Duration::from_millis(50));
    let dispatcher = BulkDispatcher::new(
        publisher.clone(),
        DispatchConfig {
            max_in_flight: 4,
            ..config()
        },
    );

    let topic = TopicName::from(channel::HEARTBEAT);
    let items: Vec<_> = (0..20).map(|i| payload(i, 4)).collect();
    let report = dispatcher.broadcast_each(&topic, items).await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(report.chunks, 20);
    assert_eq!(publisher.0.peak.load(Ordering::SeqCst), 4);
    assert_eq!(publisher.published().len(), 20);
    assert_eq!(dispatcher.in_flight(), 0);
}

#[tokio::test]
async fn oversized_messages_are_rejected() {
    let publisher = RecordingPublisher::default();
    let dispatcher = BulkDispatcher::new(
        publisher.clone(),
        DispatchConfig {
            max_chunk_size: 16,
            ..config()
        },
    );

    let topic = TopicName::from(channel::HEARTBEAT);
    let report = dispatcher
        .broadcast_each(&topic, vec![payload(1, 8), payload(2, 64)])
        .await;
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert_eq!(report.rejected, 1);
    assert_eq!(publisher.published().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn drain_gives_up_after_the_grace_period() {
    let publisher = RecordingPublisher::default().with_delay(Duration::from_secs(60));
    let dispatcher = BulkDispatcher::new(publisher, config());

    let topic = TopicName::from(channel::HEARTBEAT);
    dispatcher.broadcast_each(&topic, vec![payload(1, 4)]).await;

    assert!(!dispatcher.drain(Duration::from_secs(1)).await);
    assert_eq!(dispatcher.in_flight(), 1);
}
