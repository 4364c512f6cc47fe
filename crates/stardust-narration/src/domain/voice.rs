//! Voice parameters applied to each utterance.

use serde::{Deserialize, Serialize};

/// Rate, pitch, and volume for one utterance.
///
/// Values follow the conventions of browser speech synthesis: `rate` is a
/// multiplier of the engine's normal speed, `pitch` a multiplier around 1.0,
/// and `volume` a gain in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceOptions {
    /// Speaking rate multiplier, clamped to `[0.1, 10]`.
    pub rate: f32,
    /// Pitch multiplier, clamped to `[0, 2]`.
    pub pitch: f32,
    /// Output gain, clamped to `[0, 1]`.
    pub volume: f32,
}

impl VoiceOptions {
    /// Creates options, clamping every value into its valid range.
    #[must_use]
    pub fn new(rate: f32, pitch: f32, volume: f32) -> Self {
        Self {
            rate: rate.clamp(0.1, 10.0),
            pitch: pitch.clamp(0.0, 2.0),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Same voice at zero volume.
    #[must_use]
    pub fn silenced(self) -> Self {
        Self {
            volume: 0.0,
            ..self
        }
    }

    /// Same voice at full volume unless `muted`.
    #[must_use]
    pub fn for_mute_state(self, muted: bool) -> Self {
        if muted {
            self.silenced()
        } else {
            Self {
                volume: 1.0,
                ..self
            }
        }
    }
}

impl Default for VoiceOptions {
    fn default() -> Self {
        VoiceStyle::default().options()
    }
}

/// Named narration voices offered when a story session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceStyle {
    /// Slow, slightly raised bedtime reading voice.
    #[default]
    Calm,
    /// Brighter, quicker reading voice.
    Cheerful,
}

impl VoiceStyle {
    /// Voice parameters for this style at full volume.
    #[must_use]
    pub fn options(self) -> VoiceOptions {
        match self {
            Self::Calm => VoiceOptions::new(0.8, 1.1, 1.0),
            Self::Cheerful => VoiceOptions::new(0.95, 1.25, 1.0),
        }
    }
}
