//! Utterance identity and completion events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one narration request, unique within a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtteranceId(u64);

impl UtteranceId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utt-{}", self.0)
    }
}

/// How an utterance reached its end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrationOutcome {
    /// The backend finished speaking.
    Spoken,
    /// The text was empty; nothing was synthesized.
    NothingToSay,
    /// No speech capability is present; nothing was synthesized.
    Unavailable,
    /// The backend failed part-way. Treated as completion.
    Failed {
        /// Backend error message.
        reason: String,
    },
}

/// Terminal event for an utterance that was not cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationCompleted {
    /// The utterance this event terminates.
    pub utterance_id: UtteranceId,
    /// How it ended.
    pub outcome: NarrationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utterance_id_display_and_serde() {
        let id = UtteranceId::from_raw(7);
        assert_eq!(id.to_string(), "utt-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn test_outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(NarrationOutcome::Failed {
            reason: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["reason"], "boom");
    }
}
