//! Stardust Stories — HTTP API.
//!
//! Exposes the story catalog and playback sessions over JSON.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router without middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/stories", routes::stories::router())
        .nest("/api/v1/playback", routes::playback::router())
        .with_state(state)
}
