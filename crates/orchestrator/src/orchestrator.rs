use std::time::Duration;

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{OrchestratorError, PeerLauncher, PortAllocator, plan_pages};

/// Default number of peers started together.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default pause after a page before its peers advertise.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub peer_count: usize,
    pub page_size: usize,
    /// Pause after each page so its peers can find each other.
    pub settle: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            peer_count: 0,
            page_size: DEFAULT_PAGE_SIZE,
            settle: DEFAULT_SETTLE,
        }
    }
}

/// Outcome of [`Orchestrator::connect_peers`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectReport {
    pub requested: usize,
    pub connected: usize,
    pub failed: usize,
    pub pages: usize,
    /// Startup stopped early on shutdown.
    pub interrupted: bool,
}

/// Starts the fleet one page at a time.
pub struct Orchestrator<L> {
    launcher: L,
    config: OrchestratorConfig,
    ports: PortAllocator,
}

impl<L: PeerLauncher> Orchestrator<L> {
    pub fn new(launcher: L, config: OrchestratorConfig, ports: PortAllocator) -> Self {
        Self {
            launcher,
            config,
            ports,
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Launch every configured peer.
    ///
    /// A peer that fails to start or to bootstrap is logged and left out; the
    /// rest of its page is unaffected.
    pub async fn connect_peers(&mut self) -> Result<(Vec<L::Peer>, ConnectReport), OrchestratorError> {
        self.connect(None).await
    }

    /// [`connect_peers`](Self::connect_peers), abandoned once `shutdown` turns true.
    ///
    /// Launches of the interrupted page are dropped. Peers of finished pages
    /// are returned for the caller to close, and the report is marked
    /// `interrupted`.
    pub async fn connect_peers_until(
        &mut self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(Vec<L::Peer>, ConnectReport), OrchestratorError> {
        self.connect(Some(shutdown)).await
    }

    async fn connect(
        &mut self,
        mut shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<(Vec<L::Peer>, ConnectReport), OrchestratorError> {
        let pages = plan_pages(self.config.peer_count, self.config.page_size)?;
        let mut report = ConnectReport {
            requested: self.config.peer_count,
            ..Default::default()
        };
        let mut peers = Vec::with_capacity(self.config.peer_count);

        for (page, slots) in pages.into_iter().enumerate() {
            if shutdown.as_ref().is_some_and(|rx| *rx.borrow()) {
                report.interrupted = true;
                break;
            }

            let launcher = &self.launcher;
            let ports = &mut self.ports;
            let launches: Vec<_> = slots
                .map(move |index| {
                    let port = ports.next_port();
                    async move { (index, port, launcher.launch(index, port).await) }
                })
                .collect();

            let results = tokio::select! {
                results = join_all(launches) => results,
                () = stopped(&mut shutdown) => {
                    report.interrupted = true;
                    break;
                }
            };

            let mut page_peers = Vec::with_capacity(results.len());
            for (index, port, result) in results {
                match result {
                    Ok(peer) => page_peers.push(peer),
                    Err(error) => {
                        warn!(index, port, %error, "Failed to set up peer");
                        report.failed += 1;
                    }
                }
            }
            info!(page, connected = page_peers.len(), "Page connected");
            report.connected += page_peers.len();
            report.pages += 1;

            if !self.config.settle.is_zero() {
                info!(settle = ?self.config.settle, "Letting peers connect to each other");
                tokio::select! {
                    _ = tokio::time::sleep(self.config.settle) => {}
                    () = stopped(&mut shutdown) => {
                        report.interrupted = true;
                        peers.extend(page_peers);
                        break;
                    }
                }
            }
            for peer in &page_peers {
                self.launcher.advertise(peer).await;
            }
            peers.extend(page_peers);
        }

        if report.interrupted {
            warn!(
                connected = report.connected,
                pages = report.pages,
                "Peer setup interrupted by shutdown"
            );
        } else {
            info!(
                requested = report.requested,
                connected = report.connected,
                failed = report.failed,
                "Finished setting up peer connections"
            );
        }
        Ok((peers, report))
    }
}

/// Resolves once `shutdown` is set. Never resolves without a receiver or
/// after its sender is gone.
async fn stopped(shutdown: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = shutdown {
        if rx.wait_for(|stop| *stop).await.is_ok() {
            return;
        }
    }
    std::future::pending::<()>().await
}
