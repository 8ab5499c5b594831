//! CLI entry point.

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use siege_node_core::{
    args::{LogArgs, RunArgs},
    logging, version,
};
use tracing::info;

use crate::commands;

/// siege - gossip load and eclipse harness for sharded networks
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Flood the configured topics with generated traffic.
    Spam(RunArgs),
    /// Launch peers that join the topics and stay connected.
    Eclipse(RunArgs),
}

pub(crate) async fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(&cli.logs)?;

    info!("Starting siege {}", version::VERSION);

    match cli.command {
        Commands::Spam(args) => commands::spam::run(args).await,
        Commands::Eclipse(args) => commands::eclipse::run(args).await,
    }
}
