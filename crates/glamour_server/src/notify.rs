//! Outbound notifications to players.

use async_trait::async_trait;
use derive_more::{Display, Error};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::store::PlayerStore;
use crate::telegram::TelegramApi;
use crate::types::PlayerId;

/// Notification delivery error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Notify error: {} at {}:{}", message, file, line)]
pub struct NotifyError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NotifyError {
    /// Creates a new notify error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("HTTP error: {}", err))
    }
}

/// Best-effort message sink addressed by player.
///
/// Callers treat every error as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Delivers `message` to the player's linked channel, if any.
    async fn notify(&self, player_id: &PlayerId, message: &str) -> Result<(), NotifyError>;
}

/// Writes messages to the log instead of delivering them.
///
/// Used when no bot token is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    #[instrument(skip(self, message), fields(player_id = %player_id))]
    async fn notify(&self, player_id: &PlayerId, message: &str) -> Result<(), NotifyError> {
        info!(message, "Notification (log only)");
        Ok(())
    }
}

/// Delivers through a Telegram bot to the player's linked chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    api: TelegramApi,
    store: Arc<dyn PlayerStore>,
}

impl TelegramNotifier {
    /// Creates a notifier that resolves chats through `store`.
    pub fn new(api: TelegramApi, store: Arc<dyn PlayerStore>) -> Self {
        Self { api, store }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, message), fields(player_id = %player_id))]
    async fn notify(&self, player_id: &PlayerId, message: &str) -> Result<(), NotifyError> {
        let record = self
            .store
            .get(player_id)
            .await
            .map_err(|e| NotifyError::new(format!("Player lookup failed: {}", e)))?;

        let Some(channel) = record.and_then(|record| record.channel_id().clone()) else {
            debug!("Player has no linked chat, skipping notification");
            return Ok(());
        };

        self.api.send_message(channel.as_str(), message).await
    }
}
