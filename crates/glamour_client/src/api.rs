//! REST client for the promo server.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::ClientError;

/// Link and code state of a player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    /// True once the bot chat is linked.
    pub is_connected: bool,
    /// Issued code, if any.
    pub last_promo_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WinRequest<'a> {
    storage_id: &'a str,
    promo_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LossRequest<'a> {
    storage_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WinResponse {
    promo_code: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Typed access to the promo server's REST API.
#[derive(Debug, Clone)]
pub struct PromoApi {
    base_url: String,
    client: reqwest::Client,
}

impl PromoApi {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches link and code state. Unknown players read as unlinked.
    #[instrument(skip(self))]
    pub async fn player_status(&self, player_id: &str) -> Result<PlayerStatus, ClientError> {
        let url = format!("{}/api/player/{}", self.base_url, player_id);
        let response = self.client.get(&url).send().await?;
        let status: PlayerStatus = decode(response).await?;
        debug!(connected = status.is_connected, "Player status");
        Ok(status)
    }

    /// Reports a win with `candidate` and returns the code the server kept.
    ///
    /// On a repeat win the returned code is the one issued earlier, not
    /// `candidate`.
    #[instrument(skip(self))]
    pub async fn report_win(&self, player_id: &str, candidate: &str) -> Result<String, ClientError> {
        let url = format!("{}/api/game/win", self.base_url);
        let body = WinRequest {
            storage_id: player_id,
            promo_code: candidate,
        };
        let response = self.client.post(&url).json(&body).send().await?;
        let win: WinResponse = decode(response).await?;
        info!(code = %win.promo_code, "Win reported");
        Ok(win.promo_code)
    }

    /// Reports a loss.
    #[instrument(skip(self))]
    pub async fn report_loss(&self, player_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/game/loss", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LossRequest {
                storage_id: player_id,
            })
            .send()
            .await?;
        decode::<serde_json::Value>(response).await?;
        info!("Loss reported");
        Ok(())
    }
}

/// Decodes a success body, or turns an error status into
/// [`ClientError::Rejected`].
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Rejected {
        status: status.as_u16(),
        message,
    })
}
