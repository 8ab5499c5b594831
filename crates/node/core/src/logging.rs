//! Logging configuration for siege.

use eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use crate::args::LogArgs;

/// Initialize logging based on command line arguments.
///
/// The filter is built with the following precedence:
/// 1. If `--quiet` is set, only errors are shown
/// 2. Otherwise, start with `RUST_LOG` env var if set, or a level picked by
///    the verbosity flags (-v, -vv, etc.)
/// 3. Apply any custom filter from `--log.filter`
pub fn init_logging(args: &LogArgs) -> Result<()> {
    let filter = build_filter(args);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if args.json {
        builder.json().try_init()
    } else {
        builder.without_time().try_init()
    };
    installed.map_err(|error| eyre!("Failed to install log subscriber: {error}"))?;

    if !args.quiet {
        log_startup_banner();
    }

    Ok(())
}

fn build_filter(args: &LogArgs) -> EnvFilter {
    if args.quiet {
        return EnvFilter::new("error");
    }

    let base_level = match args.verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level));

    if let Some(custom_filter) = &args.filter {
        for directive in custom_filter.split(',') {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
    }
    filter
}

fn log_startup_banner() {
    let banner = format!(
        r#"
     _
 ___(_) ___  __ _  ___
/ __| |/ _ \/ _` |/ _ \
\__ \ |  __/ (_| |  __/
|___/_|\___|\__, |\___|
            |___/

 Gossip load harness v{}
    "#,
        crate::version::SHORT_VERSION
    );

    println!("{banner}");
}
