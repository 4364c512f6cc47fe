//! Narration domain types.

pub mod backend;
pub mod utterance;
pub mod voice;
