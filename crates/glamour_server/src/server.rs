//! Wiring a [`ServerConfig`] into running services.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::bot::LinkPoller;
use crate::config::{ServerConfig, StorageBackend};
use crate::coordinator::PromoCoordinator;
use crate::http::{AppState, router};
use crate::notify::{LogNotifier, Notifier, TelegramNotifier};
use crate::store::{MemoryPlayerStore, PlayerStore, SqlitePlayerStore, StoreError};
use crate::telegram::TelegramApi;

/// Opens the store backend the config selects.
///
/// # Errors
///
/// Returns [`StoreError`] if the SQLite database cannot be opened.
#[instrument(skip(config), fields(storage = %config.storage()))]
pub fn open_store(config: &ServerConfig) -> Result<Arc<dyn PlayerStore>, StoreError> {
    let store: Arc<dyn PlayerStore> = match config.storage() {
        StorageBackend::Memory => Arc::new(MemoryPlayerStore::new()),
        StorageBackend::Sqlite => Arc::new(SqlitePlayerStore::open(config.db_path().clone())?),
    };
    Ok(store)
}

/// Assembled server parts.
#[derive(Debug)]
pub struct PromoServer {
    coordinator: PromoCoordinator,
    poller: Option<LinkPoller>,
}

impl PromoServer {
    /// Builds the store, notifier and optional link poller for `config`.
    ///
    /// Without a bot token, notifications are logged and no poller runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be opened.
    #[instrument(skip(config))]
    pub fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let store = open_store(config)?;
        let (notifier, poller) = match config.telegram_token() {
            Some(token) => {
                info!("Telegram bot enabled");
                let api = TelegramApi::new(token.clone());
                let poller =
                    LinkPoller::new(api.clone(), Arc::clone(&store), config.link_poll_timeout());
                let notifier: Arc<dyn Notifier> =
                    Arc::new(TelegramNotifier::new(api, Arc::clone(&store)));
                (notifier, Some(poller))
            }
            None => {
                info!("No bot token configured, notifications go to the log");
                let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
                (notifier, None)
            }
        };
        Ok(Self {
            coordinator: PromoCoordinator::new(store, notifier),
            poller,
        })
    }

    /// The coordinator.
    pub fn coordinator(&self) -> &PromoCoordinator {
        &self.coordinator
    }

    /// Splits into the HTTP router and the link poller, if one is configured.
    pub fn into_parts(self) -> (axum::Router, Option<LinkPoller>) {
        (router(AppState::new(self.coordinator)), self.poller)
    }
}
