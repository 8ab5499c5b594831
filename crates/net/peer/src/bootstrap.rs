use std::time::Duration;

use futures::future::select_ok;
use libp2p::Multiaddr;
use tracing::{debug, info};

use crate::{BootstrapConfig, PeerError, PeerHandle};

/// Connect `peer` to the first reachable bootnode.
///
/// Every bootnode is dialed concurrently with its own retry budget. The first
/// success wins and the remaining attempts are dropped. The whole operation
/// is bounded by [`BootstrapConfig::timeout`].
pub async fn bootstrap(peer: &PeerHandle, config: &BootstrapConfig) -> Result<Multiaddr, PeerError> {
    if config.bootnodes.is_empty() {
        return Err(PeerError::NoBootnodes);
    }

    let attempts = config.bootnodes.iter().cloned().map(|addr| {
        Box::pin(connect_with_retries(
            peer,
            addr,
            config.retries,
            config.retry_delay,
        ))
    });

    match tokio::time::timeout(config.timeout, select_ok(attempts)).await {
        Ok(Ok((addr, _pending))) => {
            peer.mark_bootstrapped();
            info!(index = peer.index(), peer_id = %peer.peer_id(), %addr, "Connected to bootnode");
            Ok(addr)
        }
        Ok(Err(last)) => Err(PeerError::BootstrapFailed(last.to_string())),
        Err(_) => Err(PeerError::BootstrapTimeout(config.timeout)),
    }
}

async fn connect_with_retries(
    peer: &PeerHandle,
    addr: Multiaddr,
    retries: usize,
    delay: Duration,
) -> Result<Multiaddr, PeerError> {
    let attempts = retries.max(1);
    let mut reason = String::new();

    for attempt in 1..=attempts {
        match peer.dial(addr.clone()).await {
            Ok(remote) => {
                debug!(%addr, %remote, attempt, "Bootnode dial succeeded");
                return Ok(addr);
            }
            Err(PeerError::Closed) => return Err(PeerError::Closed),
            Err(error) => {
                debug!(%addr, attempt, %error, "Can't connect to bootnode");
                reason = error.to_string();
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(PeerError::BootnodeUnreachable {
        addr,
        attempts,
        reason,
    })
}
