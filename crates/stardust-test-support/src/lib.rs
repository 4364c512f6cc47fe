//! Shared test doubles and utilities for the Stardust Stories playback engine.

mod clock;
mod speech;

pub use clock::FixedClock;
pub use speech::{ManualSpeechBackend, SpeechRequest, TimedSpeechBackend};
