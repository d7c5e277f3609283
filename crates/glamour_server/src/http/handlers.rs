//! Route handlers.

use axum::Json;
use axum::extract::{Path, State};
use tracing::{debug, instrument};

use super::AppState;
use super::types::{
    AckResponse, HealthResponse, LossRequest, PlayerStatusResponse, WinRequest, WinResponse,
};
use crate::error::ServerError;
use crate::types::{PlayerId, PromoCode};

fn player_id(raw: String) -> Result<PlayerId, ServerError> {
    PlayerId::parse(raw).ok_or(ServerError::MissingPlayerId)
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::new(
        "ok".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    ))
}

/// `GET /api/player/{player_id}`
///
/// Unknown players read as unlinked with no code. No record is created.
#[instrument(skip(state))]
pub async fn player_status(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<PlayerStatusResponse>, ServerError> {
    let player_id = player_id(raw_id)?;
    let record = state.coordinator().store().get(&player_id).await?;
    let status = match record {
        Some(record) => PlayerStatusResponse::new(
            *record.is_linked(),
            record.last_promo_code().as_ref().map(|c| c.as_str().to_string()),
        ),
        None => {
            debug!(player_id = %player_id, "Unknown player");
            PlayerStatusResponse::new(false, None)
        }
    };
    Ok(Json(status))
}

/// `POST /api/game/win`
#[instrument(skip_all, fields(storage_id = %request.storage_id))]
pub async fn report_win(
    State(state): State<AppState>,
    Json(request): Json<WinRequest>,
) -> Result<Json<WinResponse>, ServerError> {
    let player_id = player_id(request.storage_id)?;
    let candidate = PromoCode::parse(request.promo_code).ok_or(ServerError::MissingPromoCode)?;
    let receipt = state.coordinator().on_win(&player_id, &candidate).await?;
    Ok(Json(WinResponse::new(
        true,
        receipt.code().as_str().to_string(),
    )))
}

/// `POST /api/game/loss`
#[instrument(skip_all, fields(storage_id = %request.storage_id))]
pub async fn report_loss(
    State(state): State<AppState>,
    Json(request): Json<LossRequest>,
) -> Result<Json<AckResponse>, ServerError> {
    let player_id = player_id(request.storage_id)?;
    state.coordinator().on_loss(&player_id).await?;
    Ok(Json(AckResponse::new(true)))
}
