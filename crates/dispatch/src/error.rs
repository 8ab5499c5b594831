use siege_net_peer::PeerError;
use siege_topics::TopicName;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to join {topic}: {source}")]
    Join {
        topic: TopicName,
        #[source]
        source: PeerError,
    },

    #[error("broadcast on {topic} failed after {attempts} attempt(s): {source}")]
    Broadcast {
        topic: TopicName,
        attempts: usize,
        #[source]
        source: PeerError,
    },
}
