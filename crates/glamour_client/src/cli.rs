//! Command-line interface for glamour_client.

use clap::Parser;
use std::path::PathBuf;

use crate::identity::DEFAULT_ID_FILE;

/// Glamour tic-tac-toe - beat the AI, win a promo code
#[derive(Parser, Debug)]
#[command(name = "glamour_client")]
#[command(about = "Play tic-tac-toe against the Glamour AI", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Promo server URL
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub server_url: String,

    /// Bot username, for the account link
    #[arg(long)]
    pub bot_username: Option<String>,

    /// File holding this machine's anonymous player id
    #[arg(long, default_value = DEFAULT_ID_FILE)]
    pub id_file: PathBuf,

    /// Opponent thinking delay in milliseconds
    #[arg(long, default_value = "600")]
    pub ai_delay_ms: u64,

    /// Seconds between link status checks
    #[arg(long, default_value = "2")]
    pub poll_interval_secs: u64,
}
