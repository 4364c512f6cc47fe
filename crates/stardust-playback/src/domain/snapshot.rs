//! Read-only view of a session for rendering.

use serde::Serialize;
use stardust_story::domain::story::{Scene, Story};
use uuid::Uuid;

use super::state::PlaybackState;

/// Everything a renderer needs after a transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    /// Session identifier.
    pub session_id: Uuid,
    /// Story title.
    pub story_title: String,
    /// Informational age label.
    pub age_range: String,
    /// Zero-based index of the current scene.
    pub scene_index: usize,
    /// One-based scene number for display.
    pub scene_number: usize,
    /// Number of scenes in the story.
    pub scene_count: usize,
    /// The current scene.
    pub scene: Scene,
    /// Narration in flight.
    pub is_playing: bool,
    /// Narration muted.
    pub is_muted: bool,
    /// Progress indicator value in `[0, 1]`.
    pub progress_fraction: f64,
    /// A previous scene exists.
    pub has_previous: bool,
    /// A next scene exists.
    pub has_next: bool,
    /// The current scene is the final one.
    pub is_last_scene: bool,
    /// Reading time rounded to whole minutes.
    pub estimated_minutes: u64,
    /// Number of events applied so far.
    pub version: i64,
}

impl PlaybackSnapshot {
    /// Captures `state` over `story`.
    #[must_use]
    pub fn capture(session_id: Uuid, story: &Story, state: &PlaybackState) -> Self {
        let index = state.current_index();
        Self {
            session_id,
            story_title: story.title().to_owned(),
            age_range: story.age_range().to_owned(),
            scene_index: index,
            scene_number: index + 1,
            scene_count: state.scene_count(),
            scene: story
                .scene(index)
                .cloned()
                .unwrap_or_else(|| Scene::new("", "", "", "")),
            is_playing: state.is_playing(),
            is_muted: state.is_muted(),
            progress_fraction: state.progress_fraction(),
            has_previous: !state.is_first_scene(),
            has_next: !state.is_last_scene(),
            is_last_scene: state.is_last_scene(),
            estimated_minutes: story.estimated_minutes(),
            version: state.version(),
        }
    }
}
