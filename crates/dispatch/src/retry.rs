use std::time::Duration;

use bytes::Bytes;
use siege_topics::TopicName;
use tracing::trace;

use crate::{DispatchError, DispatchMetrics, Publisher};

const DEFAULT_ATTEMPTS: usize = 3;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Exponential backoff for transient publish failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn backoff(&self, retry: usize) -> Duration {
        let factor = 1u32.checked_shl(retry as u32).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

pub(crate) async fn publish_with_retry<P: Publisher>(
    publisher: &P,
    topic: &TopicName,
    data: Bytes,
    policy: &RetryPolicy,
    metrics: &DispatchMetrics,
) -> Result<(), DispatchError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match publisher.publish(topic, data.clone()).await {
            Ok(()) => return Ok(()),
            Err(error) if error.is_retryable() && attempt < attempts => {
                let delay = policy.backoff(attempt - 1);
                trace!(%topic, attempt, ?delay, %error, "Retrying publish");
                metrics.inc_retries();
                tokio::time::sleep(delay).await;
            }
            Err(source) => {
                return Err(DispatchError::Broadcast {
                    topic: topic.clone(),
                    attempts: attempt,
                    source,
                });
            }
        }
    }
}
