//! Command-line interface for tictactoe_pro.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tic-Tac-Toe Pro - multiplayer tic-tac-toe server with an AI opponent
#[derive(Parser, Debug)]
#[command(name = "tictactoe_pro")]
#[command(about = "Tic-tac-toe game server with realtime updates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command that needs a configuration.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite database path, or ":memory:" for a non-persistent store
    #[arg(long)]
    pub database: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve(ConfigArgs),

    /// Print the effective configuration as TOML
    PrintConfig(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "tictactoe_pro",
            "serve",
            "--port",
            "8080",
            "--database",
            ":memory:",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.database.as_deref(), Some(":memory:"));
        assert_eq!(args.host, None);
    }

    #[test]
    fn test_parse_print_config() {
        let cli =
            Cli::try_parse_from(["tictactoe_pro", "print-config", "-c", "server.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::PrintConfig(ConfigArgs { config: Some(_), .. })
        ));
    }
}
