use std::{ops::Range, time::Duration};

use siege_primitives::Address;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::AccountProvider;

pub const DEFAULT_NONCE_RETRIES: usize = 10;
pub const DEFAULT_NONCE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Hands out nonces for one wallet.
///
/// The first reservation seeds the counter from the account API. Every
/// reservation returns a range disjoint from all earlier ones.
#[derive(Debug)]
pub struct NonceTracker {
    address: Address,
    next: Mutex<Option<u64>>,
    retries: usize,
    retry_delay: Duration,
}

impl NonceTracker {
    pub fn new(address: Address, retries: usize, retry_delay: Duration) -> Self {
        Self {
            address,
            next: Mutex::new(None),
            retries,
            retry_delay,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Reserve `count` consecutive nonces.
    pub async fn reserve(&self, count: u64, accounts: &dyn AccountProvider) -> Range<u64> {
        let mut next = self.next.lock().await;
        let start = match *next {
            Some(nonce) => nonce,
            None => self.fetch(accounts).await,
        };
        let end = start.saturating_add(count);
        *next = Some(end);
        start..end
    }

    async fn fetch(&self, accounts: &dyn AccountProvider) -> u64 {
        let attempts = self.retries.max(1);
        for attempt in 1..=attempts {
            match accounts.account(&self.address).await {
                Ok(account) => {
                    debug!(address = %self.address, nonce = account.nonce, "Fetched account nonce");
                    return account.nonce;
                }
                Err(error) if attempt < attempts => {
                    debug!(address = %self.address, attempt, %error, "Account lookup failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(error) => {
                    warn!(address = %self.address, %error, "Account lookup failed, starting from nonce 0");
                }
            }
        }
        0
    }
}
