//! Routes for the story catalog.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use stardust_story::application::catalog::StorySummary;
use stardust_story::domain::story::Story;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
async fn list_stories(State(state): State<AppState>) -> Json<Vec<StorySummary>> {
    Json(state.catalog.summaries())
}

/// GET /{slug}
#[instrument(skip(state))]
async fn get_story(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Story>, ApiError> {
    let story = state.catalog.get(&slug)?;
    Ok(Json(Story::clone(&story)))
}

/// Returns the router for the story catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stories))
        .route("/{slug}", get(get_story))
}
