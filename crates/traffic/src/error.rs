#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("failed to encode signing form: {0}")]
    SigningForm(#[from] serde_json::Error),

    #[error("receiver pool is empty")]
    NoReceivers,

    #[error("no shard ids configured for heartbeats")]
    NoShards,

    #[error("no wallet assigned to runner {0}")]
    NoWallet(usize),
}
