//! Speech-output capability boundary.

use async_trait::async_trait;
use thiserror::Error;

use super::voice::VoiceOptions;

/// Failures reported by a speech backend.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The synthesizer could not be started.
    #[error("failed to start speech synthesizer: {0}")]
    Spawn(#[source] std::io::Error),

    /// Waiting on the synthesizer failed.
    #[error("speech synthesizer I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// The synthesizer exited unsuccessfully.
    #[error("speech synthesizer exited with {0}")]
    Exited(String),

    /// Any other backend-specific failure.
    #[error("speech backend error: {0}")]
    Backend(String),
}

/// A "speak text aloud" capability.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Whether speech output works in this environment. Probed once when a
    /// narration driver is built.
    fn is_available(&self) -> bool;

    /// Speaks `text` and resolves when the audio has finished.
    ///
    /// Dropping the returned future must stop audio immediately; the driver
    /// cancels utterances by aborting the task that polls it.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn speak(&self, text: &str, voice: VoiceOptions) -> Result<(), SpeechError>;
}
