//! JSON bodies of the REST API. Field names are camelCase on the wire.

use derive_new::new;
use serde::{Deserialize, Serialize};

/// `POST /api/game/win` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase", default)]
pub struct WinRequest {
    /// Anonymous player id.
    pub storage_id: String,
    /// Client-generated candidate code.
    pub promo_code: String,
}

/// `POST /api/game/loss` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase", default)]
pub struct LossRequest {
    /// Anonymous player id.
    pub storage_id: String,
}

/// `GET /api/player/{playerId}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatusResponse {
    /// True once the bot chat is linked.
    pub is_connected: bool,
    /// Issued code, if any.
    pub last_promo_code: Option<String>,
}

/// `POST /api/game/win` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct WinResponse {
    /// Always true on this path.
    pub success: bool,
    /// Final code. Equals the stored one on repeat wins.
    pub promo_code: String,
}

/// `POST /api/game/loss` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct AckResponse {
    /// Always true on this path.
    pub success: bool,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}

impl ErrorResponse {
    /// Failure body with `error` as the reason.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct HealthResponse {
    /// `"ok"` while serving.
    pub status: String,
    /// Server crate version.
    pub version: String,
}
