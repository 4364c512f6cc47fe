//! Narration orchestration.

pub mod driver;
