//! Node infrastructure for the siege binary.
//!
//! - [`args`] - CLI argument structs
//! - [`config`] - figment-based configuration loading
//! - [`files`] - receiver, data and address file loaders
//! - [`logging`] - logging initialization
//! - [`version`] - version information

pub mod args;
pub mod config;
pub mod files;
pub mod logging;
pub mod version;
