//! Process-wide stop signal.

use tokio::sync::watch;
use tracing::{info, warn};

/// Flips to `true` on SIGINT or SIGTERM.
pub(crate) fn install() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal");
        let _ = tx.send(true);
    });
    rx
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(error) => warn!(%error, "Failed to install SIGTERM handler"),
        }
    }

    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to listen for Ctrl+C, running until killed");
        std::future::pending::<()>().await;
    }
}

/// Wait until the flag turns `true` or its sender is gone.
pub(crate) async fn wait(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
