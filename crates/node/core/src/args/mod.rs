//! CLI argument structs.
//!
//! [`RunArgs`] values override the loaded configuration; see
//! [`crate::config::SiegeConfig::apply_args`].

mod log;
mod run;

pub use log::LogArgs;
pub use run::RunArgs;
