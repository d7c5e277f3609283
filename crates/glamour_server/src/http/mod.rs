//! REST API over the promo coordinator.

mod handlers;
pub mod types;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tracing::info;

use crate::coordinator::PromoCoordinator;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    coordinator: PromoCoordinator,
}

impl AppState {
    /// State serving `coordinator`.
    pub fn new(coordinator: PromoCoordinator) -> Self {
        Self { coordinator }
    }

    /// The coordinator behind every route.
    pub fn coordinator(&self) -> &PromoCoordinator {
        &self.coordinator
    }
}

/// Builds the API router with request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/player/{player_id}", get(handlers::player_status))
        .route("/api/game/win", post(handlers::report_win))
        .route("/api/game/loss", post(handlers::report_loss))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}
