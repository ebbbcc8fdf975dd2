//! mondap - CLI for the mondap Q&A API.
//!
//! This is a thin wrapper over the `mondap-client` library. Credential
//! pairs are issued by an external login flow and imported with
//! `mondap session import`.

mod cli;
mod commands;
mod output;
mod store;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Session(cmd) => commands::session::handle(cmd).await,
        Commands::Question(cmd) => commands::question::handle(cmd).await,
        Commands::Answer(cmd) => commands::answer::handle(cmd).await,
        Commands::Image(cmd) => commands::image::handle(cmd).await,
        Commands::Ranking(cmd) => commands::ranking::handle(cmd).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
