//! Peer key material.
//!
//! Each peer of the fleet gets a secp256k1 libp2p keypair. With a configured
//! seed every peer derives its key from `"{seed}-{index}"`, so the same fleet
//! comes back with the same peer ids after a restart. Without a seed keys are
//! drawn from the OS-seeded thread RNG.

mod seed;

pub use seed::SeedReader;

use std::fmt;

use libp2p::{
    PeerId,
    identity::{Keypair, secp256k1},
};
use rand::RngCore;
use tracing::trace;

/// Attempts made before giving up on producing a valid secret scalar.
const MAX_KEY_ATTEMPTS: usize = 16;

/// Length of a secp256k1 secret key.
const SECRET_KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("seed must not be empty")]
    InvalidSeed,

    #[error("read buffer must not be empty")]
    InvalidBuffer,

    #[error("no valid secret key after {MAX_KEY_ATTEMPTS} attempts")]
    KeyGeneration,
}

/// Where key bytes come from.
#[derive(Debug, Clone)]
pub enum KeySource {
    Seeded(SeedReader),
    Os,
}

impl KeySource {
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<(), IdentityError> {
        match self {
            Self::Seeded(reader) => reader.read(buf).map(|_| ()),
            Self::Os => {
                if buf.is_empty() {
                    return Err(IdentityError::InvalidBuffer);
                }
                rand::rng().fill_bytes(buf);
                Ok(())
            }
        }
    }
}

/// A peer's keypair together with its derived [`PeerId`].
#[derive(Clone)]
pub struct PeerIdentity {
    keypair: Keypair,
    peer_id: PeerId,
}

impl PeerIdentity {
    /// Generate a secp256k1 identity from `source`.
    pub fn generate(source: &mut KeySource) -> Result<Self, IdentityError> {
        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let mut bytes = [0u8; SECRET_KEY_LEN];
            source.fill(&mut bytes)?;
            match secp256k1::SecretKey::try_from_bytes(&mut bytes) {
                Ok(secret) => {
                    let keypair = Keypair::from(secp256k1::Keypair::from(secret));
                    return Ok(Self::from_keypair(keypair));
                }
                Err(error) => trace!(attempt, %error, "rejected secret key bytes"),
            }
        }
        Err(IdentityError::KeyGeneration)
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        let peer_id = keypair.public().to_peer_id();
        Self { keypair, peer_id }
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }
}

impl fmt::Debug for PeerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerIdentity")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

/// Builds one identity per fleet slot.
#[derive(Debug, Clone, Default)]
pub struct IdentityFactory {
    seed: Option<String>,
}

impl IdentityFactory {
    pub fn new(seed: Option<String>) -> Self {
        Self { seed }
    }

    pub fn is_deterministic(&self) -> bool {
        self.seed.is_some()
    }

    /// Key source for the peer at `index`.
    pub fn source_for(&self, index: usize) -> KeySource {
        match &self.seed {
            Some(seed) if seed.is_empty() => KeySource::Seeded(SeedReader::new(Vec::new())),
            Some(seed) => KeySource::Seeded(SeedReader::new(format!("{seed}-{index}"))),
            None => KeySource::Os,
        }
    }

    pub fn identity_for(&self, index: usize) -> Result<PeerIdentity, IdentityError> {
        PeerIdentity::generate(&mut self.source_for(index))
    }
}
