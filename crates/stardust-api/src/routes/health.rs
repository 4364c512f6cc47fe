//! Liveness endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Body of GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok` while the server is answering.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Stories in the catalog.
    pub stories: usize,
    /// Playback sessions currently running.
    pub sessions: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        stories: state.catalog.len(),
        sessions: state.sessions.len(),
    })
}

/// Returns the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
