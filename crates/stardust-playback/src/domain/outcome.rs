//! Results of playback transitions.

use serde::Serialize;
use thiserror::Error;

/// Why a transition or event left the state untouched.
///
/// None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoredReason {
    /// `prev_scene` at the first scene.
    #[error("already at the first scene")]
    AtFirstScene,
    /// `next_scene` at the last scene.
    #[error("already at the last scene")]
    AtLastScene,
    /// A completion for an utterance that was cancelled or superseded.
    #[error("narration completion is stale")]
    StaleNarration,
    /// A settle-delay expiry for an auto-advance that was cancelled.
    #[error("auto-advance is stale")]
    StaleAutoAdvance,
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed.
    Applied,
    /// State unchanged.
    Ignored(IgnoredReason),
}

impl Transition {
    /// Whether the state changed.
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }

    /// The reason, for ignored transitions.
    #[must_use]
    pub fn ignored_reason(self) -> Option<IgnoredReason> {
        match self {
            Self::Applied => None,
            Self::Ignored(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_reason_serializes_as_snake_case_code() {
        let json = serde_json::to_value(IgnoredReason::AtLastScene).unwrap();
        assert_eq!(json, "at_last_scene");
        assert_eq!(
            IgnoredReason::StaleNarration.to_string(),
            "narration completion is stale"
        );
    }

    #[test]
    fn test_transition_accessors() {
        assert!(Transition::Applied.is_applied());
        assert_eq!(Transition::Applied.ignored_reason(), None);
        let ignored = Transition::Ignored(IgnoredReason::AtFirstScene);
        assert!(!ignored.is_applied());
        assert_eq!(ignored.ignored_reason(), Some(IgnoredReason::AtFirstScene));
    }
}
