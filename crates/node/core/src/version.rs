//! Version information for siege.

/// The version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The short version information for siege.
pub const SHORT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The git commit SHA, when provided at build time.
pub const GIT_SHA: &str = {
    match option_env!("SIEGE_GIT_SHA") {
        Some(sha) => sha,
        None => "unknown",
    }
};

/// The agent version announced over identify.
pub const P2P_CLIENT_VERSION: &str = concat!("siege/v", env!("CARGO_PKG_VERSION"));

/// Version and commit, for `--version` output.
pub fn long_version() -> String {
    format!("Version: {VERSION}\nCommit SHA: {GIT_SHA}")
}
