//! Playback orchestration.

pub mod auto_advance;
pub mod controller;
pub mod registry;
pub mod session;
