//! Backend for environments without speech output.

use async_trait::async_trait;
use stardust_narration::domain::backend::{SpeechBackend, SpeechError};
use stardust_narration::domain::voice::VoiceOptions;

/// Always reports speech as unavailable, so the narration driver degrades to
/// silent auto-advance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBackend;

#[async_trait]
impl SpeechBackend for SilentBackend {
    fn name(&self) -> &str {
        "silent"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn speak(&self, _text: &str, _voice: VoiceOptions) -> Result<(), SpeechError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_silent_backend_is_never_available() {
        let backend = SilentBackend;
        assert!(!backend.is_available());
        assert_eq!(backend.name(), "silent");
        backend
            .speak("Goodnight", VoiceOptions::default())
            .await
            .unwrap();
    }
}
