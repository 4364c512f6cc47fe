//! Stardust Core — shared domain abstractions.
//!
//! This crate defines the traits and types that the story, narration, and
//! playback crates depend on. It contains no runtime or I/O code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
