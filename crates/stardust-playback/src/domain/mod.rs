//! Playback domain types.

pub mod commands;
pub mod events;
pub mod outcome;
pub mod snapshot;
pub mod state;
