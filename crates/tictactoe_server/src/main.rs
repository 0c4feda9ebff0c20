//! Tic-Tac-Toe Pro - server CLI
//!
//! Serves the game API or prints the configuration it would use.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, ConfigArgs};
use tictactoe_server::ServerConfig;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => run_server(args).await,
        Command::PrintConfig(args) => print_config(args),
    }
}

/// Resolves defaults, config file, environment and flags, in that order.
#[instrument(skip_all)]
fn resolve_config(args: ConfigArgs) -> Result<ServerConfig> {
    let config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let config = config
        .apply_env()?
        .with_overrides(args.host, args.port, args.database);
    debug!(?config, "Resolved configuration");
    Ok(config)
}

/// Run the HTTP game server
async fn run_server(args: ConfigArgs) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tictactoe_server=debug")),
        )
        .init();

    let config = resolve_config(args)?;
    info!(address = %config.bind_address(), "Starting Tic-Tac-Toe Pro server");
    tictactoe_server::serve(&config).await
}

/// Print the effective configuration
fn print_config(args: ConfigArgs) -> Result<()> {
    let config = resolve_config(args)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
