//! User-initiated playback commands.

use serde::{Deserialize, Serialize};
use stardust_core::command::Command;
use uuid::Uuid;

/// The four user-facing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackCommandKind {
    /// Start narrating the current scene, or stop narration in flight.
    TogglePlayback,
    /// Move to the following scene.
    NextScene,
    /// Move to the preceding scene.
    PrevScene,
    /// Flip the mute state.
    ToggleMute,
}

/// A playback command addressed to one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCommand {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The requested transition.
    pub kind: PlaybackCommandKind,
}

impl PlaybackCommand {
    /// Creates a command with a fresh correlation ID.
    #[must_use]
    pub fn new(kind: PlaybackCommandKind) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            kind,
        }
    }

    /// Shorthand for [`PlaybackCommandKind::TogglePlayback`].
    #[must_use]
    pub fn toggle_playback() -> Self {
        Self::new(PlaybackCommandKind::TogglePlayback)
    }

    /// Shorthand for [`PlaybackCommandKind::NextScene`].
    #[must_use]
    pub fn next_scene() -> Self {
        Self::new(PlaybackCommandKind::NextScene)
    }

    /// Shorthand for [`PlaybackCommandKind::PrevScene`].
    #[must_use]
    pub fn prev_scene() -> Self {
        Self::new(PlaybackCommandKind::PrevScene)
    }

    /// Shorthand for [`PlaybackCommandKind::ToggleMute`].
    #[must_use]
    pub fn toggle_mute() -> Self {
        Self::new(PlaybackCommandKind::ToggleMute)
    }
}

impl Command for PlaybackCommand {
    fn command_type(&self) -> &'static str {
        match self.kind {
            PlaybackCommandKind::TogglePlayback => "playback.toggle_playback",
            PlaybackCommandKind::NextScene => "playback.next_scene",
            PlaybackCommandKind::PrevScene => "playback.prev_scene",
            PlaybackCommandKind::ToggleMute => "playback.toggle_mute",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
