//! `siege spam`: flood the target's topics with synthetic traffic.

use std::sync::Arc;

use bytes::Bytes;
use eyre::{Result, WrapErr};
use futures::future::join_all;
use siege_dispatch::{BulkDispatcher, DispatchReport};
use siege_node_core::{
    args::RunArgs,
    config::SiegeConfig,
    files::{load_data, load_receivers},
};
use siege_traffic::{
    AccountProvider, EconomicsSnapshot, HttpAccountClient, OfflineAccounts, PayloadKind,
    TrafficPlan, TrafficRunner, Wallet, WalletSlot, runner_rng,
};
use tracing::{info, warn};

use crate::{shutdown, status::StatusReporter};

pub(crate) async fn run(args: RunArgs) -> Result<()> {
    let config = SiegeConfig::resolve(&args)?;
    config.validate_traffic()?;

    let slots = load_wallets(&config)?;
    let plan = Arc::new(build_plan(&config)?);
    let accounts = account_provider(&config)?;

    let mut shutdown = shutdown::install();
    let Some(peers) = super::launch_fleet(&config, &shutdown).await? else {
        return Ok(());
    };
    info!(
        peers = peers.len(),
        wallets = slots.len(),
        kinds = ?plan.kinds,
        concurrency = plan.concurrency,
        "Starting traffic (press Ctrl+C to stop)"
    );

    let runners: Vec<_> = peers
        .iter()
        .map(|peer| {
            let dispatcher = BulkDispatcher::new(peer.clone(), config.dispatch_config());
            let mut runner = TrafficRunner::new(
                peer.index(),
                plan.clone(),
                dispatcher,
                accounts.clone(),
                peer.peer_id().to_bytes(),
                runner_rng(config.identity.seed.as_deref(), peer.index()),
            );
            if let Some(slot) = slots.get(peer.index() % slots.len().max(1)) {
                runner = runner.with_wallet(slot.clone());
            }
            tokio::spawn(runner.run(shutdown.clone()))
        })
        .collect();

    let reporter = StatusReporter::new(peers.clone(), config.network.status_interval());
    let reporting = tokio::spawn(reporter.run(shutdown.clone()));

    let mut total = DispatchReport::default();
    for result in join_all(runners).await {
        match result {
            Ok(report) => total.merge(report),
            Err(error) => warn!(%error, "Traffic runner panicked"),
        }
    }
    shutdown::wait(&mut shutdown).await;
    let _ = reporting.await;

    info!(
        payloads = total.payloads,
        chunks = total.chunks,
        rejected = total.rejected,
        skipped = total.skipped,
        "Traffic stopped"
    );
    super::close_fleet(&peers).await;
    Ok(())
}

/// The configured account API, or zero nonces without one.
fn account_provider(config: &SiegeConfig) -> Result<Arc<dyn AccountProvider>> {
    if config.account.api_urls.is_empty() {
        if config.traffic.sends(PayloadKind::Transactions) {
            warn!("No account API configured, nonces start at zero");
        }
        return Ok(Arc::new(OfflineAccounts));
    }
    let client = HttpAccountClient::new(config.account.api_urls.clone())
        .wrap_err("Invalid account API endpoints")?;
    Ok(Arc::new(client))
}

fn load_wallets(config: &SiegeConfig) -> Result<Vec<Arc<WalletSlot>>> {
    let Some(dir) = &config.traffic.wallets_dir else {
        return Ok(Vec::new());
    };
    let wallets = Wallet::load_dir(dir).wrap_err("Failed to load wallets")?;
    Ok(wallets
        .into_iter()
        .map(|wallet| {
            Arc::new(WalletSlot::new(
                wallet,
                config.account.nonce_retries,
                config.account.nonce_retry_delay(),
            ))
        })
        .collect())
}

fn build_plan(config: &SiegeConfig) -> Result<TrafficPlan> {
    let traffic = &config.traffic;
    let receivers = match &traffic.receivers_file {
        Some(path) => load_receivers(path).wrap_err("Failed to load receivers")?,
        None => Vec::new(),
    };
    let data = match &traffic.data_file {
        Some(path) => load_data(path).wrap_err("Failed to load data file")?,
        None => Bytes::new(),
    };

    Ok(TrafficPlan {
        kinds: traffic.kinds.clone(),
        concurrency: traffic.concurrency,
        round_delay: traffic.round_delay(),
        shutdown_grace: traffic.shutdown_grace(),
        coordinator: config.coordinator()?,
        receivers: Arc::from(receivers),
        data,
        amount: traffic.amount,
        gas: traffic.gas,
        heartbeat: traffic.heartbeat.clone(),
        economics: EconomicsSnapshot::default(),
        topics: config.topics()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_the_account_api_when_configured() {
        let mut config = SiegeConfig::default();
        config.account.api_urls = vec!["http://127.0.0.1:7950/".into()];
        assert!(account_provider(&config).is_ok());
    }

    #[test]
    fn falls_back_to_offline_accounts() {
        let config = SiegeConfig::default();
        assert!(account_provider(&config).is_ok());
    }

    #[test]
    fn plan_follows_the_config() {
        let mut config = SiegeConfig::default();
        config.traffic.kinds = vec![PayloadKind::Heartbeats];
        config.traffic.concurrency = 7;

        let plan = build_plan(&config).unwrap();
        assert_eq!(plan.kinds, vec![PayloadKind::Heartbeats]);
        assert_eq!(plan.concurrency, 7);
        assert!(plan.receivers.is_empty());
        assert!(plan.data.is_empty());
        assert_eq!(plan.topics, config.topics().unwrap());
    }
}
