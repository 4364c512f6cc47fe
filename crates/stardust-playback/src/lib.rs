//! Stardust Stories — scene playback.
//!
//! The [`PlaybackController`](application::controller::PlaybackController)
//! owns the playback state of one viewing session: which scene is current,
//! whether narration is in flight, and how far through the story the reader
//! is. Each session runs on its own task behind a
//! [`SessionHandle`](application::session::SessionHandle), so every
//! transition is handled one at a time.

pub mod application;
pub mod domain;
