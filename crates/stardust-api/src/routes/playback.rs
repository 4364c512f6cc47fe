//! Routes for playback sessions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use stardust_core::error::DomainError;
use stardust_narration::domain::voice::VoiceStyle;
use stardust_playback::domain::commands::{PlaybackCommand, PlaybackCommandKind};
use stardust_playback::domain::events::PlaybackEvent;
use stardust_playback::domain::outcome::IgnoredReason;
use stardust_playback::domain::snapshot::PlaybackSnapshot;
use stardust_story::domain::story::Story;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
///
/// Exactly one of `story_slug` and `story` must be given.
#[derive(Debug, Deserialize)]
pub struct StartPlaybackRequest {
    /// Catalog slug of the story to play.
    #[serde(default)]
    pub story_slug: Option<String>,
    /// Inline story document.
    #[serde(default)]
    pub story: Option<serde_json::Value>,
    /// Reading voice; defaults to calm.
    #[serde(default)]
    pub voice_style: Option<VoiceStyle>,
}

/// Response body for POST /.
#[derive(Debug, Serialize)]
pub struct StartPlaybackResponse {
    /// The new session.
    pub session_id: Uuid,
    /// Its initial state.
    pub snapshot: PlaybackSnapshot,
}

/// Response body for the transition endpoints.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    /// `applied` or `ignored`.
    pub outcome: &'static str,
    /// Why the transition was ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IgnoredReason>,
    /// State after the transition.
    pub snapshot: PlaybackSnapshot,
}

/// POST /
#[instrument(skip(state, request))]
async fn start_playback(
    State(state): State<AppState>,
    Json(request): Json<StartPlaybackRequest>,
) -> Result<(StatusCode, Json<StartPlaybackResponse>), ApiError> {
    let story = match (request.story_slug, request.story) {
        (Some(slug), None) => state.catalog.get(&slug)?,
        (None, Some(document)) => {
            let story: Story = serde_json::from_value(document)
                .map_err(|e| DomainError::Validation(format!("invalid story document: {e}")))?;
            Arc::new(story)
        }
        _ => {
            return Err(DomainError::Validation(
                "provide exactly one of `story_slug` or `story`".into(),
            )
            .into());
        }
    };

    let session = state.sessions.start(story, request.voice_style);
    let snapshot = session.snapshot().await?;
    info!(session_id = %session.session_id(), story = %snapshot.story_title, "playback session created");

    Ok((
        StatusCode::CREATED,
        Json(StartPlaybackResponse {
            session_id: session.session_id(),
            snapshot,
        }),
    ))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_snapshot(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let snapshot = state.sessions.get(session_id)?.snapshot().await?;
    Ok(Json(snapshot))
}

/// GET /{session_id}/events
#[instrument(skip(state))]
async fn get_events(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<PlaybackEvent>>, ApiError> {
    let events = state.sessions.get(session_id)?.history().await?;
    Ok(Json(events))
}

/// DELETE /{session_id}
#[instrument(skip(state))]
async fn end_playback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.end(session_id).await?;
    info!("playback session ended");
    Ok(StatusCode::NO_CONTENT)
}

async fn transition(
    state: &AppState,
    session_id: Uuid,
    kind: PlaybackCommandKind,
) -> Result<Json<TransitionResponse>, ApiError> {
    let command = PlaybackCommand::new(kind);
    info!(%session_id, correlation_id = %command.correlation_id, ?kind, "handling playback command");

    let receipt = state.sessions.get(session_id)?.execute(command).await?;
    let reason = receipt.transition.ignored_reason();
    Ok(Json(TransitionResponse {
        outcome: if reason.is_some() { "ignored" } else { "applied" },
        reason,
        snapshot: receipt.snapshot,
    }))
}

/// POST /{session_id}/toggle-playback
#[instrument(skip(state))]
async fn toggle_playback(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, session_id, PlaybackCommandKind::TogglePlayback).await
}

/// POST /{session_id}/next-scene
#[instrument(skip(state))]
async fn next_scene(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, session_id, PlaybackCommandKind::NextScene).await
}

/// POST /{session_id}/prev-scene
#[instrument(skip(state))]
async fn prev_scene(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, session_id, PlaybackCommandKind::PrevScene).await
}

/// POST /{session_id}/toggle-mute
#[instrument(skip(state))]
async fn toggle_mute(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TransitionResponse>, ApiError> {
    transition(&state, session_id, PlaybackCommandKind::ToggleMute).await
}

/// Returns the router for playback sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_playback))
        .route("/{session_id}", get(get_snapshot).delete(end_playback))
        .route("/{session_id}/events", get(get_events))
        .route("/{session_id}/toggle-playback", post(toggle_playback))
        .route("/{session_id}/next-scene", post(next_scene))
        .route("/{session_id}/prev-scene", post(prev_scene))
        .route("/{session_id}/toggle-mute", post(toggle_mute))
}
