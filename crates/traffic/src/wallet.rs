//! Sender wallets.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use ed25519_dalek::{SECRET_KEY_LENGTH, Signature, Signer, SigningKey};
use siege_primitives::Address;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: key material is not hex: {source}")]
    Hex {
        path: PathBuf,
        #[source]
        source: hex::FromHexError,
    },

    #[error("{path}: expected 32 or 64 key bytes, got {len}")]
    Length { path: PathBuf, len: usize },

    #[error("{path}: public key does not match the secret key")]
    KeyMismatch { path: PathBuf },

    #[error("no wallet files in {0}")]
    Empty(PathBuf),
}

/// An account able to sign transfers.
#[derive(Clone)]
pub struct Wallet {
    address: Address,
    key: SigningKey,
}

impl Wallet {
    pub fn from_secret(secret: [u8; SECRET_KEY_LENGTH]) -> Self {
        let key = SigningKey::from_bytes(&secret);
        Self {
            address: Address::new(key.verifying_key().to_bytes()),
            key,
        }
    }

    /// Parse a key file's content.
    ///
    /// Accepts the hex of a 32-byte seed, or of the 64-byte `seed || public
    /// key` form found in exported wallet files.
    pub fn from_key_material(material: &str, path: &Path) -> Result<Self, WalletError> {
        let bytes = hex::decode(material.trim()).map_err(|source| WalletError::Hex {
            path: path.to_path_buf(),
            source,
        })?;

        let (secret, public) = match bytes.len() {
            32 => (bytes.as_slice(), None),
            64 => {
                let (secret, public) = bytes.split_at(SECRET_KEY_LENGTH);
                (secret, Some(public))
            }
            len => {
                return Err(WalletError::Length {
                    path: path.to_path_buf(),
                    len,
                });
            }
        };

        let mut seed = [0u8; SECRET_KEY_LENGTH];
        seed.copy_from_slice(secret);
        let wallet = Self::from_secret(seed);

        if public.is_some_and(|public| public != wallet.address.as_bytes().as_slice()) {
            return Err(WalletError::KeyMismatch {
                path: path.to_path_buf(),
            });
        }
        Ok(wallet)
    }

    pub fn load(path: &Path) -> Result<Self, WalletError> {
        let material = fs::read_to_string(path).map_err(|source| WalletError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_key_material(&material, path)
    }

    /// Load every regular file of `dir`, in file name order.
    pub fn load_dir(dir: &Path) -> Result<Vec<Self>, WalletError> {
        let io = |source| WalletError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io)? {
            let entry = entry.map_err(io)?;
            if entry.file_type().map_err(io)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let wallets = paths
            .iter()
            .map(|path| Self::load(path))
            .collect::<Result<Vec<_>, _>>()?;
        if wallets.is_empty() {
            return Err(WalletError::Empty(dir.to_path_buf()));
        }
        debug!(count = wallets.len(), dir = %dir.display(), "Loaded wallets");
        Ok(wallets)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.key.sign(message)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
