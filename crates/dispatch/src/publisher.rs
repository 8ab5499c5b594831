use std::future::Future;

use bytes::Bytes;
use siege_net_peer::{JoinOutcome, PeerError, PeerHandle};
use siege_topics::TopicName;

/// The two operations a dispatcher needs from a peer.
pub trait Publisher: Clone + Send + Sync + 'static {
    fn join_topic(
        &self,
        topic: &TopicName,
    ) -> impl Future<Output = Result<JoinOutcome, PeerError>> + Send;

    fn publish(
        &self,
        topic: &TopicName,
        data: Bytes,
    ) -> impl Future<Output = Result<(), PeerError>> + Send;
}

impl Publisher for PeerHandle {
    async fn join_topic(&self, topic: &TopicName) -> Result<JoinOutcome, PeerError> {
        PeerHandle::join_topic(self, topic).await
    }

    async fn publish(&self, topic: &TopicName, data: Bytes) -> Result<(), PeerError> {
        PeerHandle::publish(self, topic, data).await
    }
}
