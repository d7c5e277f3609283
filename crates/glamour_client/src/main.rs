//! Glamour tic-tac-toe client binary.

use anyhow::Result;
use clap::Parser;
use glamour_client::cli::Cli;
use glamour_client::{PlayerIdentity, PromoApi, deep_link, run_session, wait_until_linked};
use glamour_tictactoe::{GameSession, OpponentTurnScheduler};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with the board.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let identity = PlayerIdentity::load_or_create(&cli.id_file)?;
    let api = PromoApi::new(cli.server_url.clone());
    info!(player_id = %identity.id(), server = %api.base_url(), "Client starting");

    println!("✨ Glamour Tic-Tac-Toe ✨");
    println!("Beat the AI to win an exclusive promo code.");

    let linked = match api.player_status(identity.id()).await {
        Ok(status) => {
            if let Some(code) = &status.last_promo_code {
                println!("🎟 Your promo code: {}", code);
            }
            status.is_connected
        }
        Err(e) => {
            warn!(error = %e, "Status check failed");
            println!("Promo server unreachable, results may not be saved.");
            false
        }
    };

    let poller = match (&cli.bot_username, linked) {
        (Some(bot), false) => {
            println!(
                "Link the bot to receive your codes: {}",
                deep_link(bot, identity.id())
            );
            let api = api.clone();
            let id = identity.id().clone();
            let interval = Duration::from_secs(cli.poll_interval_secs);
            Some(tokio::spawn(async move {
                wait_until_linked(&api, &id, interval).await;
                println!("\n✨ Account connected! Results will arrive in your bot chat.");
            }))
        }
        _ => None,
    };

    let session = Arc::new(Mutex::new(GameSession::new()));
    let mut scheduler =
        OpponentTurnScheduler::new(session, Duration::from_millis(cli.ai_delay_ms));
    let mut rng = SmallRng::from_os_rng();
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();

    let summary = run_session(
        input,
        &mut out,
        &api,
        identity.id(),
        &mut scheduler,
        &mut rng,
    )
    .await?;

    if let Some(poller) = poller {
        poller.abort();
    }
    println!(
        "Thanks for playing! {} games: {} won, {} lost, {} drawn.",
        summary.rounds, summary.wins, summary.losses, summary.draws
    );
    Ok(())
}
