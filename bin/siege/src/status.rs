//! Periodic per-peer status logging.

use std::time::Duration;

use siege_net_peer::PeerHandle;
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{debug, info};

const MIN_INTERVAL: Duration = Duration::from_secs(1);

pub(crate) struct StatusReporter {
    peers: Vec<PeerHandle>,
    interval: Duration,
}

impl StatusReporter {
    pub(crate) fn new(peers: Vec<PeerHandle>, interval: Duration) -> Self {
        Self {
            peers,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Log every peer's state each interval until `shutdown` fires.
    pub(crate) async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.report().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    async fn report(&self) {
        for peer in &self.peers {
            let status = match peer.status().await {
                Ok(status) => status,
                Err(error) => {
                    debug!(index = peer.index(), %error, "Failed to query peer status");
                    continue;
                }
            };

            let mut remotes: Vec<String> =
                status.remote_addrs.iter().map(ToString::to_string).collect();
            remotes.sort();
            let topics: Vec<String> = status
                .topics
                .iter()
                .map(|topic| format!("{}={}", topic.topic, topic.mesh_peers))
                .collect();

            info!(
                index = peer.index(),
                peer_id = %status.peer_id,
                bootstrapped = status.bootstrapped,
                listen = ?status.listen_addrs,
                connected = remotes.len(),
                ?remotes,
                ?topics,
                "Peer status"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(StatusReporter::new(Vec::new(), Duration::ZERO).run(rx));

        tokio::time::sleep(Duration::from_secs(3)).await;
        tx.send(true).unwrap();
        task.await.unwrap();
    }
}
