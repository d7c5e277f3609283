//! Minimal Telegram Bot API client.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::notify::NotifyError;

/// Default Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Raw chat id as Telegram reports it.
pub type ChatId = i64;

/// Standard Bot API response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry from `getUpdates`.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Update {
    update_id: i64,
    message: Option<Message>,
}

/// Incoming chat message.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Message {
    chat: Chat,
    text: Option<String>,
}

/// Chat a message arrived in.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Chat {
    id: ChatId,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

impl std::fmt::Debug for TelegramApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramApi")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl TelegramApi {
    /// Creates a client for the public Bot API.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Creates a client against a custom endpoint.
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Sends a Markdown message to `chat_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on transport failure or an API-level refusal.
    #[instrument(skip(self, text), fields(chat_id = %chat_id))]
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id,
            text,
            parse_mode: "Markdown",
        };
        let envelope: Envelope<serde_json::Value> = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        check(envelope).map(|_| debug!("Message delivered"))
    }

    /// Long-polls for updates after `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] on transport failure or an API-level refusal.
    #[instrument(skip(self))]
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, NotifyError> {
        let body = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ["message"],
        };
        let envelope: Envelope<Vec<Update>> = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(timeout + Duration::from_secs(10))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        let updates = check(envelope)?;
        debug!(count = updates.len(), "Updates received");
        Ok(updates)
    }
}

#[track_caller]
fn check<T>(envelope: Envelope<T>) -> Result<T, NotifyError> {
    match envelope {
        Envelope {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        Envelope { description, .. } => Err(NotifyError::new(format!(
            "Bot API refused request: {}",
            description.unwrap_or_else(|| "no description".to_string())
        ))),
    }
}
