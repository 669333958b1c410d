//! survey-embed - Main Entry Point

use clap::Parser;
use survey_embed::cli::{cmd_build, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "survey_embed=info".into()),
        )
        .init();

    let cli = Cli::parse();
    cmd_build(cli)
}
