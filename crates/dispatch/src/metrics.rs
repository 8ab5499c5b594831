//! Dispatch metrics.

use metrics::Counter;

/// Counters shared by every broadcast task of a dispatcher.
#[derive(Clone, Debug)]
pub struct DispatchMetrics {
    /// Chunks and single messages handed to the network
    pub(crate) published_total: Counter,
    /// Broadcasts that failed after all retries
    pub(crate) failures_total: Counter,
    /// Retried publish attempts
    pub(crate) retries_total: Counter,
    /// Payloads too large for a single chunk
    pub(crate) rejected_total: Counter,
    /// Broadcast tasks that have ended, successfully or not
    pub(crate) finished_total: Counter,
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self {
            published_total: metrics::counter!("dispatch.published_total"),
            failures_total: metrics::counter!("dispatch.failures_total"),
            retries_total: metrics::counter!("dispatch.retries_total"),
            rejected_total: metrics::counter!("dispatch.rejected_payloads_total"),
            finished_total: metrics::counter!("dispatch.finished_total"),
        }
    }
}

impl DispatchMetrics {
    pub(crate) fn inc_published(&self) {
        self.published_total.increment(1);
    }

    pub(crate) fn inc_failures(&self) {
        self.failures_total.increment(1);
    }

    pub(crate) fn inc_retries(&self) {
        self.retries_total.increment(1);
    }

    pub(crate) fn add_rejected(&self, count: usize) {
        self.rejected_total.increment(count as u64);
    }

    /// Guard that counts the broadcast as finished when dropped.
    pub(crate) fn finish_guard(&self) -> FinishOnDrop {
        FinishOnDrop(self.finished_total.clone())
    }
}

/// Increments its counter on drop, so panicking tasks are counted too.
pub(crate) struct FinishOnDrop(Counter);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.increment(1);
    }
}
