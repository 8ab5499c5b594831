#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("port range {base}..{max} is empty")]
    InvalidPortRange { base: u16, max: u16 },
}
