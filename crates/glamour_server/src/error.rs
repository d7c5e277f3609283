//! Server error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, From};
use tracing::{error, warn};

use crate::http::types::ErrorResponse;
use crate::store::StoreError;

/// Errors surfaced by the coordinator and the HTTP API.
#[derive(Debug, Display, From)]
pub enum ServerError {
    /// Persistence failed; nothing was committed.
    #[display("{}", _0)]
    Store(StoreError),

    /// The request named no player.
    #[display("storageId must not be empty")]
    #[from(ignore)]
    MissingPlayerId,

    /// A win arrived without a candidate code.
    #[display("promoCode must not be empty")]
    #[from(ignore)]
    MissingPromoCode,
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::MissingPlayerId | Self::MissingPromoCode => None,
        }
    }
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingPlayerId | Self::MissingPromoCode => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Rejected request");
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
