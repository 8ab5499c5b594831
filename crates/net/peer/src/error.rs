use std::time::Duration;

use libp2p::{Multiaddr, gossipsub};
use siege_identity::IdentityError;
use siege_topics::TopicName;

/// Why a gossip publish was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishFailure {
    #[error("message was already published")]
    Duplicate,

    #[error("message exceeds the transmit size")]
    TooLarge,

    #[error("{0}")]
    Transient(String),
}

impl From<gossipsub::PublishError> for PublishFailure {
    fn from(error: gossipsub::PublishError) -> Self {
        match error {
            gossipsub::PublishError::Duplicate => Self::Duplicate,
            gossipsub::PublishError::MessageTooLarge => Self::TooLarge,
            other => Self::Transient(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("transport setup failed: {0}")]
    Transport(String),

    #[error("gossipsub setup failed: {0}")]
    Gossipsub(String),

    #[error("invalid protocol name: {0}")]
    Protocol(String),

    #[error("failed to listen on {addr}: {reason}")]
    Listen { addr: Multiaddr, reason: String },

    #[error("dial failed: {0}")]
    Dial(String),

    #[error("no bootnodes configured")]
    NoBootnodes,

    #[error("bootnode {addr} unreachable after {attempts} attempts: {reason}")]
    BootnodeUnreachable {
        addr: Multiaddr,
        attempts: usize,
        reason: String,
    },

    #[error("no bootnode reachable: {0}")]
    BootstrapFailed(String),

    #[error("bootstrap timed out after {0:?}")]
    BootstrapTimeout(Duration),

    #[error("failed to join topic {topic}: {reason}")]
    Subscribe { topic: TopicName, reason: String },

    #[error("topic {0} has not been joined")]
    NotJoined(TopicName),

    #[error("publish on {topic} failed: {failure}")]
    Publish {
        topic: TopicName,
        failure: PublishFailure,
    },

    #[error("peer event loop has stopped")]
    Closed,
}

impl PeerError {
    /// Whether repeating the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Publish {
                failure: PublishFailure::Transient(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_publish_failures_retry() {
        let topic = TopicName::from("transactions_0");
        let transient = PeerError::Publish {
            topic: topic.clone(),
            failure: PublishFailure::Transient("no peers".into()),
        };
        let duplicate = PeerError::Publish {
            topic: topic.clone(),
            failure: PublishFailure::Duplicate,
        };
        let too_large = PeerError::Publish {
            topic,
            failure: PublishFailure::TooLarge,
        };

        assert!(transient.is_retryable());
        assert!(!duplicate.is_retryable());
        assert!(!too_large.is_retryable());
        assert!(!PeerError::Closed.is_retryable());
    }

    #[test]
    fn gossipsub_errors_are_classified() {
        assert_eq!(
            PublishFailure::from(gossipsub::PublishError::Duplicate),
            PublishFailure::Duplicate
        );
        assert_eq!(
            PublishFailure::from(gossipsub::PublishError::MessageTooLarge),
            PublishFailure::TooLarge
        );
    }
}
