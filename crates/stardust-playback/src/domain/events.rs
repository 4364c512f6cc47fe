//! Domain events for scene playback.

use serde::{Deserialize, Serialize};
use stardust_core::event::{DomainEvent, EventMetadata};
use stardust_narration::domain::utterance::{NarrationOutcome, UtteranceId};

/// Why narration in flight was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The user paused playback.
    Paused,
    /// The user moved to another scene.
    SceneChanged,
    /// The user toggled mute.
    MuteToggled,
    /// The session ended.
    SessionEnded,
}

/// What moved the reader to a new scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneTrigger {
    /// `next_scene`.
    Next,
    /// `prev_scene`.
    Previous,
    /// The settle delay after narration elapsed.
    AutoAdvance,
}

/// Event payload variants for scene playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEventKind {
    /// Narration for a scene was requested.
    NarrationStarted {
        /// Scene being narrated.
        scene_index: usize,
        /// Utterance carrying the narration.
        utterance_id: UtteranceId,
        /// Volume sampled when speaking started.
        volume: f32,
    },
    /// Narration in flight was cancelled.
    NarrationStopped {
        /// Scene that was being narrated.
        scene_index: usize,
        /// The cancelled utterance.
        utterance_id: UtteranceId,
        /// What stopped it.
        reason: StopReason,
    },
    /// Narration reached its end.
    NarrationFinished {
        /// Scene that was narrated.
        scene_index: usize,
        /// The finished utterance.
        utterance_id: UtteranceId,
        /// How it ended.
        outcome: NarrationOutcome,
    },
    /// An automatic advance will happen after the settle delay.
    AutoAdvanceScheduled {
        /// Scene the advance will leave.
        from_index: usize,
        /// Settle delay in milliseconds.
        delay_ms: u64,
    },
    /// A pending automatic advance was cancelled.
    AutoAdvanceCancelled {
        /// Scene the advance would have left.
        from_index: usize,
    },
    /// The current scene changed.
    SceneChanged {
        /// Previous scene index.
        from: usize,
        /// New scene index.
        to: usize,
        /// What caused the change.
        trigger: SceneTrigger,
    },
    /// The mute state flipped.
    MuteToggled {
        /// Mute state after the toggle.
        muted: bool,
    },
}

/// Domain event envelope for scene playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl PlaybackEventKind {
    /// The event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NarrationStarted { .. } => "playback.narration_started",
            Self::NarrationStopped { .. } => "playback.narration_stopped",
            Self::NarrationFinished { .. } => "playback.narration_finished",
            Self::AutoAdvanceScheduled { .. } => "playback.auto_advance_scheduled",
            Self::AutoAdvanceCancelled { .. } => "playback.auto_advance_cancelled",
            Self::SceneChanged { .. } => "playback.scene_changed",
            Self::MuteToggled { .. } => "playback.mute_toggled",
        }
    }
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
