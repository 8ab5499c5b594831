//! siege binary.

mod cli;
mod commands;
mod shutdown;
mod status;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    cli::run().await
}
