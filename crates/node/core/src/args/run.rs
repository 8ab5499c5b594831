use std::path::PathBuf;

use clap::Args;

/// Flags shared by the fleet commands.
#[derive(Debug, Args, Clone, Default, PartialEq)]
#[command(next_help_heading = "Fleet")]
pub struct RunArgs {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH", env = "SIEGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of peers to launch.
    #[arg(long, value_name = "N")]
    pub peers: Option<usize>,

    /// Payloads generated per kind and round, per peer.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// File whose bytes are used as transaction data and raw messages.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// File with one receiver address (hex) per line.
    #[arg(long, value_name = "PATH")]
    pub receivers: Option<PathBuf>,

    /// Directory of wallet key files.
    #[arg(long, value_name = "DIR")]
    pub wallets: Option<PathBuf>,

    /// Seed for reproducible peer identities and traffic.
    #[arg(long = "p2p-seed", value_name = "SEED")]
    pub p2p_seed: Option<String>,

    /// Comma separated multiaddrs of the seed nodes.
    ///
    /// --network.bootnodes /ip4/10.0.0.1/tcp/10000/p2p/PeerID
    #[arg(long = "network.bootnodes", value_delimiter = ',', value_name = "ADDRS")]
    pub bootnodes: Option<Vec<String>>,

    /// First port of the listen port range.
    #[arg(long = "network.port", value_name = "PORT")]
    pub port: Option<u16>,
}
