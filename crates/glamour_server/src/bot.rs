//! Bot account linking.
//!
//! The client shows a deep link carrying its player id. Opening it sends
//! `/start connect_<id>` to the bot, and [`LinkPoller`] turns that message
//! into a [`PlayerStore::link`] call followed by a confirmation.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::messages;
use crate::notify::NotifyError;
use crate::store::{PlayerStore, StoreError};
use crate::telegram::{TelegramApi, Update};
use crate::types::{ChannelId, PlayerId};

/// Payload prefix of the link command.
pub const CONNECT_PREFIX: &str = "connect_";

/// Deep link that opens the bot and sends the link command for `player_id`.
pub fn deep_link(bot_username: &str, player_id: &PlayerId) -> String {
    format!(
        "https://t.me/{}?start={}{}",
        bot_username.trim_start_matches('@'),
        CONNECT_PREFIX,
        player_id
    )
}

/// Extracts the player id from `/start connect_<id>`.
///
/// Also accepts the `/start@botname` form Telegram sends in groups. Anything
/// else yields `None`.
pub fn parse_start_command(text: &str) -> Option<PlayerId> {
    let mut parts = text.split_whitespace();
    let command = parts.next()?;
    if command != "/start" && !command.starts_with("/start@") {
        return None;
    }
    let payload = parts.next()?;
    PlayerId::parse(payload.strip_prefix(CONNECT_PREFIX)?)
}

/// Errors from handling one update.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LinkError {
    /// Persisting the link failed.
    #[display("{}", _0)]
    Store(StoreError),
    /// Sending the confirmation failed.
    #[display("{}", _0)]
    Notify(NotifyError),
}

/// Long-polls the bot for link commands.
#[derive(Debug, Clone)]
pub struct LinkPoller {
    api: TelegramApi,
    store: Arc<dyn PlayerStore>,
    timeout: Duration,
}

impl LinkPoller {
    /// Creates a poller with a `getUpdates` long-poll timeout of `timeout`.
    pub fn new(api: TelegramApi, store: Arc<dyn PlayerStore>, timeout: Duration) -> Self {
        Self {
            api,
            store,
            timeout,
        }
    }

    /// Polls until the task is aborted.
    ///
    /// Transport errors are logged and retried after a short pause.
    #[instrument(skip(self))]
    pub async fn run(self) {
        info!("Link poller started");
        let mut offset = 0;
        loop {
            match self.api.get_updates(offset, self.timeout).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id() + 1);
                        if let Err(e) = self.handle_update(&update).await {
                            warn!(error = %e, update_id = update.update_id(), "Link update failed");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed, retrying");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Applies one update. Returns the linked player, if it was a link command.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] if the link cannot be stored or confirmed.
    #[instrument(skip(self, update), fields(update_id = update.update_id()))]
    pub async fn handle_update(&self, update: &Update) -> Result<Option<PlayerId>, LinkError> {
        let Some(message) = update.message() else {
            return Ok(None);
        };
        let Some(player_id) = message.text().as_deref().and_then(parse_start_command) else {
            debug!("Not a link command");
            return Ok(None);
        };

        let channel = ChannelId::new(message.chat().id().to_string());
        let record = self.store.link(&player_id, &channel).await?;
        info!(player_id = %player_id, channel_id = %channel, "Account linked");

        let text = messages::linked(record.last_promo_code().as_ref());
        self.api.send_message(channel.as_str(), &text).await?;
        Ok(Some(player_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_command() {
        assert_eq!(
            parse_start_command("/start connect_abc-123"),
            PlayerId::parse("abc-123")
        );
        assert_eq!(
            parse_start_command("/start@glamour_bot connect_xyz"),
            PlayerId::parse("xyz")
        );
    }

    #[test]
    fn test_parse_rejects_other_text() {
        assert_eq!(parse_start_command("/start"), None);
        assert_eq!(parse_start_command("/start connect_"), None);
        assert_eq!(parse_start_command("/start hello"), None);
        assert_eq!(parse_start_command("/help connect_abc"), None);
        assert_eq!(parse_start_command("connect_abc"), None);
    }

    #[test]
    fn test_deep_link() {
        let id = PlayerId::parse("0199-abc").expect("id");
        assert_eq!(
            deep_link("@glamour_bot", &id),
            "https://t.me/glamour_bot?start=connect_0199-abc"
        );
    }
}
