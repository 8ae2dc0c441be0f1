//! Taintriage - AI-assisted triage of static-analysis findings

use anyhow::Result;
use clap::Parser;
use taintriage::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI args first so --log-level can seed the filter.
    let cli = cli::Cli::parse();

    // Logs go to stderr; reports own stdout.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    cli::run(cli)
}
