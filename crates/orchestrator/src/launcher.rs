use std::future::Future;

use siege_identity::IdentityFactory;
use siege_net_peer::{BootstrapConfig, PeerConfig, PeerError, PeerHandle, bootstrap, spawn_peer};
use tracing::debug;

/// Starts one fleet peer.
pub trait PeerLauncher: Send + Sync {
    type Peer: Send;

    /// Start the peer for slot `index` listening on `port` and connect it.
    fn launch(
        &self,
        index: usize,
        port: u16,
    ) -> impl Future<Output = Result<Self::Peer, PeerError>> + Send;

    /// Make `peer` discoverable by the rest of the fleet.
    fn advertise(&self, peer: &Self::Peer) -> impl Future<Output = ()> + Send;
}

/// Launches libp2p peers and bootstraps them against the configured seed nodes.
#[derive(Debug, Clone)]
pub struct NetworkLauncher {
    identities: IdentityFactory,
    peer: PeerConfig,
    bootstrap: BootstrapConfig,
}

impl NetworkLauncher {
    pub fn new(identities: IdentityFactory, peer: PeerConfig, bootstrap: BootstrapConfig) -> Self {
        Self {
            identities,
            peer,
            bootstrap,
        }
    }
}

impl PeerLauncher for NetworkLauncher {
    type Peer = PeerHandle;

    async fn launch(&self, index: usize, port: u16) -> Result<PeerHandle, PeerError> {
        let identity = self.identities.identity_for(index)?;
        let config = self.peer.clone().with_port(port);
        let handle = spawn_peer(index, identity, &config)?;

        if let Err(error) = bootstrap(&handle, &self.bootstrap).await {
            handle.close().await;
            return Err(error);
        }
        Ok(handle)
    }

    async fn advertise(&self, peer: &PeerHandle) {
        if let Err(error) = peer.advertise().await {
            debug!(peer_id = %peer.peer_id(), %error, "Failed to advertise peer");
        }
    }
}
