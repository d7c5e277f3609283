//! Command-line interface for glamour_server.

use clap::{Parser, Subcommand};

use crate::config::StorageBackend;

/// Glamour promo server - issues promo codes for tic-tac-toe wins
#[derive(Parser, Debug)]
#[command(name = "glamour_server")]
#[command(about = "Promo code server for the Glamour tic-tac-toe game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API (and the bot link poller when a token is set)
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Storage backend (overrides config)
        #[arg(long, value_enum)]
        storage: Option<StorageBackend>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Create or upgrade the SQLite database, then exit
    Migrate {
        /// SQLite database path
        #[arg(long, default_value = "glamour_promo.db")]
        db_path: String,
    },
}
