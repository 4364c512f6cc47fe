//! Stardust Stories — narration.
//!
//! The narration driver turns narration requests into spoken audio through a
//! pluggable [`SpeechBackend`](domain::backend::SpeechBackend) and reports
//! exactly one completion per utterance, unless the utterance was cancelled.

pub mod application;
pub mod domain;
