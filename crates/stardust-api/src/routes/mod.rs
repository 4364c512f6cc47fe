//! Route modules organized by resource.

pub mod health;
pub mod playback;
pub mod stories;
