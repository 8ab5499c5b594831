//! Per-peer traffic rounds.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use siege_dispatch::{BulkDispatcher, DispatchReport, Publisher};
use siege_identity::SeedReader;
use siege_primitives::{Address, ShardCoordinator};
use siege_topics::{TopicName, channel};
use siege_wire::denominate;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    AccountProvider, EconomicsSnapshot, GasParams, HeartbeatParams, NonceTracker, PayloadError,
    TransferBuilder, Wallet, build_heartbeat, build_reward, bundle_rewards,
    transfer::DENOMINATION,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Transactions,
    Heartbeats,
    Rewards,
    Raw,
}

/// What every runner of a fleet sends. Shared read-only between runners.
#[derive(Debug, Clone)]
pub struct TrafficPlan {
    pub kinds: Vec<PayloadKind>,
    /// Payloads generated per kind and round.
    pub concurrency: usize,
    pub round_delay: Duration,
    pub shutdown_grace: Duration,
    pub coordinator: ShardCoordinator,
    pub receivers: Arc<[Address]>,
    /// Transaction data, and the body of raw messages.
    pub data: Bytes,
    /// Transfer value in whole tokens.
    pub amount: f64,
    pub gas: GasParams,
    pub heartbeat: HeartbeatParams,
    pub economics: EconomicsSnapshot,
    /// Topics joined before the first round. Raw messages go to all of them.
    pub topics: Vec<TopicName>,
}

/// A wallet together with the nonce counter every runner using it shares.
#[derive(Debug)]
pub struct WalletSlot {
    pub wallet: Wallet,
    pub nonces: NonceTracker,
}

impl WalletSlot {
    pub fn new(wallet: Wallet, retries: usize, retry_delay: Duration) -> Self {
        Self {
            nonces: NonceTracker::new(wallet.address(), retries, retry_delay),
            wallet,
        }
    }
}

/// RNG for runner `index`: reproducible under a seed, OS-seeded otherwise.
pub fn runner_rng(seed: Option<&str>, index: usize) -> StdRng {
    let mut bytes = [0u8; 32];
    match seed {
        Some(seed) => match SeedReader::new(format!("{seed}-traffic-{index}")).read(&mut bytes) {
            Ok(_) => StdRng::from_seed(bytes),
            Err(error) => {
                warn!(index, %error, "Unusable traffic seed, falling back to OS entropy");
                StdRng::from_os_rng()
            }
        },
        None => StdRng::from_os_rng(),
    }
}

/// Generates and dispatches traffic for one peer.
pub struct TrafficRunner<P> {
    index: usize,
    plan: Arc<TrafficPlan>,
    dispatcher: BulkDispatcher<P>,
    wallet: Option<Arc<WalletSlot>>,
    accounts: Arc<dyn AccountProvider>,
    pid: Vec<u8>,
    rng: StdRng,
}

impl<P: Publisher> TrafficRunner<P> {
    pub fn new(
        index: usize,
        plan: Arc<TrafficPlan>,
        dispatcher: BulkDispatcher<P>,
        accounts: Arc<dyn AccountProvider>,
        pid: Vec<u8>,
        rng: StdRng,
    ) -> Self {
        Self {
            index,
            plan,
            dispatcher,
            wallet: None,
            accounts,
            pid,
            rng,
        }
    }

    pub fn with_wallet(mut self, wallet: Arc<WalletSlot>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn dispatcher(&self) -> &BulkDispatcher<P> {
        &self.dispatcher
    }

    /// Generate and dispatch one batch of every enabled kind.
    pub async fn run_round(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        let plan = self.plan.clone();
        for kind in &plan.kinds {
            let result = match kind {
                PayloadKind::Transactions => self.send_transactions().await,
                PayloadKind::Heartbeats => Ok(self.send_heartbeats().await),
                PayloadKind::Rewards => self.send_rewards().await,
                PayloadKind::Raw => Ok(self.send_raw().await),
            };
            match result {
                Ok(sent) => report.merge(sent),
                Err(error) => warn!(runner = self.index, ?kind, %error, "Skipping payload kind"),
            }
        }
        report
    }

    /// Join the plan's topics, then run rounds until `shutdown` turns true.
    ///
    /// In-flight broadcasts get the plan's grace period to finish.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> DispatchReport {
        let joined = self.join_topics().await;
        info!(runner = self.index, joined, "Runner started");

        let mut total = DispatchReport::default();
        let mut rounds = 0usize;
        while !*shutdown.borrow() {
            total.merge(self.run_round().await);
            rounds += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.plan.round_delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        let drained = self.dispatcher.drain(self.plan.shutdown_grace).await;
        if !drained {
            warn!(
                runner = self.index,
                in_flight = self.dispatcher.in_flight(),
                "Broadcasts still running after grace period"
            );
        }
        info!(runner = self.index, rounds, payloads = total.payloads, "Runner stopped");
        total
    }

    async fn join_topics(&self) -> usize {
        let mut joined = 0;
        for topic in &self.plan.topics {
            match self.dispatcher.publisher().join_topic(topic).await {
                Ok(_) => joined += 1,
                Err(error) => warn!(runner = self.index, %topic, %error, "Failed to join topic"),
            }
        }
        joined
    }

    async fn send_transactions(&mut self) -> Result<DispatchReport, PayloadError> {
        let slot = self.wallet.clone().ok_or(PayloadError::NoWallet(self.index))?;
        if self.plan.receivers.is_empty() {
            return Err(PayloadError::NoReceivers);
        }

        let count = self.plan.concurrency as u64;
        let nonces = slot.nonces.reserve(count, self.accounts.as_ref()).await;
        let builder = TransferBuilder::new(&slot.wallet, self.plan.gas)
            .value(denominate(self.plan.amount, DENOMINATION))
            .data(self.plan.data.clone());

        let mut payloads = Vec::with_capacity(self.plan.concurrency);
        for nonce in nonces {
            let Some(receiver) = self.plan.receivers.choose(&mut self.rng).copied() else {
                break;
            };
            match builder.build(receiver, nonce) {
                Ok(transfer) => {
                    debug!(
                        sender = %slot.wallet.address(),
                        %receiver,
                        nonce,
                        hash = %transfer.hash,
                        "Generated transfer"
                    );
                    let shard = self.plan.coordinator.compute_shard(&receiver);
                    payloads.push((shard, transfer.bytes));
                }
                Err(error) => warn!(runner = self.index, nonce, %error, "Failed to build transfer"),
            }
        }

        let own_shard = self.plan.coordinator.compute_shard(&slot.wallet.address());
        Ok(self
            .dispatcher
            .dispatch_routed(own_shard, channel::TRANSACTIONS, payloads)
            .await)
    }

    async fn send_heartbeats(&mut self) -> DispatchReport {
        let mut items = Vec::with_capacity(self.plan.concurrency);
        for _ in 0..self.plan.concurrency {
            match build_heartbeat(&self.plan.heartbeat, &self.pid, &mut self.rng) {
                Ok(bytes) => items.push(bytes),
                Err(error) => warn!(runner = self.index, %error, "Failed to build heartbeat"),
            }
        }
        self.dispatcher
            .broadcast_each(&TopicName::from(channel::HEARTBEAT), items)
            .await
    }

    async fn send_rewards(&mut self) -> Result<DispatchReport, PayloadError> {
        if self.plan.receivers.is_empty() {
            return Err(PayloadError::NoReceivers);
        }

        let mut rewards = Vec::with_capacity(self.plan.concurrency);
        for _ in 0..self.plan.concurrency {
            let Some(receiver) = self.plan.receivers.choose(&mut self.rng).copied() else {
                break;
            };
            rewards.push(build_reward(
                &self.plan.economics,
                receiver,
                &self.plan.coordinator,
                &mut self.rng,
            ));
        }

        let bundle = bundle_rewards(rewards);
        debug!(
            runner = self.index,
            mini_blocks = bundle.mini_blocks.len(),
            "Bundled rewards"
        );
        let mut report = DispatchReport::default();
        for (topic, items) in bundle.broadcasts {
            report.merge(self.dispatcher.broadcast_each(&topic, items).await);
        }
        Ok(report)
    }

    async fn send_raw(&mut self) -> DispatchReport {
        let mut report = DispatchReport::default();
        for topic in &self.plan.topics {
            let items = vec![self.plan.data.clone(); self.plan.concurrency];
            report.merge(self.dispatcher.broadcast_each(topic, items).await);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;

    #[test]
    fn seeded_rngs_are_reproducible_per_index() {
        let mut a = runner_rng(Some("fleet"), 3);
        let mut b = runner_rng(Some("fleet"), 3);
        let mut c = runner_rng(Some("fleet"), 4);
        let (x, y, z) = (a.next_u64(), b.next_u64(), c.next_u64());
        assert_eq!(x, y);
        assert_ne!(x, z);
    }

    #[test]
    fn payload_kinds_use_lowercase_names() {
        let kinds: Vec<PayloadKind> =
            serde_json::from_str(r#"["transactions","heartbeats","rewards","raw"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![
                PayloadKind::Transactions,
                PayloadKind::Heartbeats,
                PayloadKind::Rewards,
                PayloadKind::Raw
            ]
        );
    }
}
