//! `promptgen` - command-line shell for the security testing prompt generator.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod shell;
mod transport;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Generate(args) => commands::generate(&cli.base_url, cli.json, args).await,
        Commands::Categories => commands::categories(cli.json),
        Commands::Health(args) => commands::health(&cli.base_url, cli.json, args).await,
    }
}

/// Logs go to stderr so stdout stays clean for results.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
