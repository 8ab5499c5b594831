//! Fleet commands.

pub(crate) mod eclipse;
pub(crate) mod spam;

use eyre::{Result, bail};
use futures::future::join_all;
use siege_identity::IdentityFactory;
use siege_net_peer::PeerHandle;
use siege_node_core::config::SiegeConfig;
use siege_orchestrator::{NetworkLauncher, Orchestrator};
use tokio::sync::watch;
use tracing::info;

/// Start and bootstrap the configured number of peers.
///
/// Returns `None` when `shutdown` fires first; peers started until then are
/// closed.
pub(crate) async fn launch_fleet(
    config: &SiegeConfig,
    shutdown: &watch::Receiver<bool>,
) -> Result<Option<Vec<PeerHandle>>> {
    let identities = IdentityFactory::new(config.identity.seed.clone());
    let launcher = NetworkLauncher::new(
        identities,
        config.peer_config(),
        config.bootstrap_config()?,
    );
    let mut orchestrator =
        Orchestrator::new(launcher, config.orchestrator_config(), config.port_allocator()?);

    let (peers, report) = orchestrator.connect_peers_until(shutdown.clone()).await?;
    if report.interrupted {
        close_fleet(&peers).await;
        return Ok(None);
    }

    info!(
        requested = report.requested,
        connected = report.connected,
        failed = report.failed,
        pages = report.pages,
        "Fleet connected"
    );
    if peers.is_empty() {
        bail!("No peer could connect to the network");
    }
    Ok(Some(peers))
}

/// Close every peer and announce the exit.
pub(crate) async fn close_fleet(peers: &[PeerHandle]) {
    join_all(peers.iter().map(PeerHandle::close)).await;
    info!(peers = peers.len(), "Peers closed, terminating at user's signal");
}
