//! Glamour promo server binary.

use anyhow::Result;
use clap::Parser;
use glamour_server::cli::{Cli, Command};
use glamour_server::{CONNECT_PREFIX, PlayerRepository, PromoServer, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,glamour_server=debug")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            storage,
            db_path,
        } => {
            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(storage) = storage {
                config = config.with_storage(storage);
            }
            if let Some(db_path) = db_path {
                config = config.with_db_path(db_path);
            }
            serve(config).await
        }
        Command::Migrate { db_path } => {
            PlayerRepository::open(db_path)?;
            info!("Database ready");
            Ok(())
        }
    }
}

/// Run the HTTP API until Ctrl+C.
async fn serve(config: ServerConfig) -> Result<()> {
    info!(
        host = %config.host(),
        port = config.port(),
        storage = %config.storage(),
        "Starting Glamour promo server"
    );

    let (app, poller) = PromoServer::from_config(&config)?.into_parts();
    let poller = poller.map(|poller| tokio::spawn(poller.run()));
    match config.bot_username() {
        Some(bot) => info!(bot = %bot, "Players link via https://t.me/{}?start={}<id>", bot, CONNECT_PREFIX),
        None => warn!("bot_username not set, link instructions unavailable"),
    }

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("✅ Server ready at http://{}:{}/", config.host(), config.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(poller) = poller {
        poller.abort();
    }
    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}
