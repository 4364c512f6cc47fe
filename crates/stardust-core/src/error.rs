//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Playback transitions never produce these; they cover the edges of the
/// engine where a caller asks for something that does not exist or supplies
/// data that breaks an invariant.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No playback session is registered under the identifier.
    #[error("playback session not found: {0}")]
    SessionNotFound(Uuid),

    /// No story is registered under the slug.
    #[error("story not found: {0}")]
    StoryNotFound(String),

    /// Supplied data violates a domain invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// A runtime or I/O failure outside the domain model.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
