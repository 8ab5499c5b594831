//! Remote account lookups.

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use siege_primitives::Address;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("no account API endpoints configured")]
    NoEndpoints,

    #[error("account request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
}

/// Account state as reported by the network API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    pub nonce: u64,
    #[serde(default)]
    pub balance: String,
}

#[async_trait]
pub trait AccountProvider: Send + Sync {
    async fn account(&self, address: &Address) -> Result<AccountInfo, AccountError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AccountResponse {
    Wrapped { data: AccountData },
    Bare { account: AccountInfo },
}

#[derive(Deserialize)]
struct AccountData {
    account: AccountInfo,
}

impl AccountResponse {
    fn into_account(self) -> AccountInfo {
        match self {
            Self::Wrapped { data } => data.account,
            Self::Bare { account } => account,
        }
    }
}

/// Queries `GET {base}/address/{hex}` on a randomly chosen endpoint.
#[derive(Debug, Clone)]
pub struct HttpAccountClient {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl HttpAccountClient {
    pub fn new(endpoints: Vec<String>) -> Result<Self, AccountError> {
        if endpoints.is_empty() {
            return Err(AccountError::NoEndpoints);
        }
        let endpoints = endpoints
            .into_iter()
            .map(|base| base.trim_end_matches('/').to_string())
            .collect();
        Ok(Self {
            client: reqwest::Client::new(),
            endpoints,
        })
    }

    fn url_for(&self, address: &Address) -> Result<String, AccountError> {
        let base = self
            .endpoints
            .choose(&mut rand::rng())
            .ok_or(AccountError::NoEndpoints)?;
        Ok(format!("{base}/address/{}", address.to_hex()))
    }
}

#[async_trait]
impl AccountProvider for HttpAccountClient {
    async fn account(&self, address: &Address) -> Result<AccountInfo, AccountError> {
        let url = self.url_for(address)?;
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AccountError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body: AccountResponse = response.json().await?;
        Ok(body.into_account())
    }
}

/// Provider used when no API is configured: every account starts at nonce 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAccounts;

#[async_trait]
impl AccountProvider for OfflineAccounts {
    async fn account(&self, _address: &Address) -> Result<AccountInfo, AccountError> {
        Ok(AccountInfo::default())
    }
}
