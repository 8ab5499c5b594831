//! `siege eclipse`: occupy the target's topics with idle peers.

use eyre::Result;
use futures::future::join_all;
use siege_node_core::{args::RunArgs, config::SiegeConfig};
use tracing::info;

use crate::{shutdown, status::StatusReporter};

pub(crate) async fn run(args: RunArgs) -> Result<()> {
    let config = SiegeConfig::resolve(&args)?;
    let topics = config.topics()?;
    let mut shutdown = shutdown::install();

    let Some(peers) = super::launch_fleet(&config, &shutdown).await? else {
        return Ok(());
    };

    let joined = join_all(peers.iter().map(|peer| peer.join_topics(&topics))).await;
    info!(
        peers = peers.len(),
        topics = topics.len(),
        joined = joined.iter().sum::<usize>(),
        "Peers joined topics (press Ctrl+C to stop)"
    );

    let reporter = StatusReporter::new(peers.clone(), config.network.status_interval());
    let reporting = tokio::spawn(reporter.run(shutdown.clone()));

    shutdown::wait(&mut shutdown).await;
    let _ = reporting.await;

    super::close_fleet(&peers).await;
    Ok(())
}
