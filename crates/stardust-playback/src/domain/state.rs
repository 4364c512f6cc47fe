//! Playback state and the rules that evolve it.

use serde::Serialize;

use super::events::{PlaybackEvent, PlaybackEventKind};

/// Authoritative playback state of one session.
///
/// Changes only through [`apply`](Self::apply), so a session's journal
/// replayed over [`PlaybackState::new`] reproduces it exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    scene_count: usize,
    current_index: usize,
    is_playing: bool,
    is_muted: bool,
    progress_fraction: f64,
    auto_advance_pending: bool,
    version: i64,
}

impl PlaybackState {
    /// Initial state for a story with `scene_count` scenes: first scene,
    /// paused, unmuted, no progress.
    #[must_use]
    pub fn new(scene_count: usize) -> Self {
        Self {
            scene_count: scene_count.max(1),
            current_index: 0,
            is_playing: false,
            is_muted: false,
            progress_fraction: 0.0,
            auto_advance_pending: false,
            version: 0,
        }
    }

    /// Rebuilds state from a journal.
    #[must_use]
    pub fn replay<'a>(
        scene_count: usize,
        events: impl IntoIterator<Item = &'a PlaybackEvent>,
    ) -> Self {
        let mut state = Self::new(scene_count);
        for event in events {
            state.apply(&event.kind);
        }
        state
    }

    /// Applies one event.
    pub fn apply(&mut self, kind: &PlaybackEventKind) {
        match kind {
            PlaybackEventKind::NarrationStarted { .. } => self.is_playing = true,
            PlaybackEventKind::NarrationStopped { .. }
            | PlaybackEventKind::NarrationFinished { .. } => self.is_playing = false,
            PlaybackEventKind::AutoAdvanceScheduled { .. } => self.auto_advance_pending = true,
            PlaybackEventKind::AutoAdvanceCancelled { .. } => self.auto_advance_pending = false,
            PlaybackEventKind::SceneChanged { from, to, .. } => {
                let to = (*to).min(self.last_index());
                self.progress_fraction = progress_after_move(*from, to, self.scene_count);
                self.current_index = to;
                self.is_playing = false;
                self.auto_advance_pending = false;
            }
            PlaybackEventKind::MuteToggled { muted } => self.is_muted = *muted,
        }
        self.version += 1;
    }

    /// Number of scenes in the story.
    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scene_count
    }

    /// Index of the current scene, always below `scene_count`.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Index of the final scene.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.scene_count - 1
    }

    /// True only while narration for the current scene is in flight.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Whether narration is muted. Survives scene changes.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.is_muted
    }

    /// Progress indicator value in `[0, 1]`.
    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        self.progress_fraction
    }

    /// Whether an automatic advance is waiting out the settle delay.
    #[must_use]
    pub fn auto_advance_pending(&self) -> bool {
        self.auto_advance_pending
    }

    /// Number of events applied.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Whether the current scene is the first.
    #[must_use]
    pub fn is_first_scene(&self) -> bool {
        self.current_index == 0
    }

    /// Whether the current scene is the last.
    #[must_use]
    pub fn is_last_scene(&self) -> bool {
        self.current_index == self.last_index()
    }
}

/// Forward moves count the landing scene as read: `(to + 1) / n`.
/// Backward moves show `to / n`.
#[allow(clippy::cast_precision_loss)]
fn progress_after_move(from: usize, to: usize, scene_count: usize) -> f64 {
    let read = if to > from { to + 1 } else { to };
    (read as f64 / scene_count as f64).clamp(0.0, 1.0)
}
