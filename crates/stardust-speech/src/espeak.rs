//! eSpeak NG backend.
//!
//! Each utterance runs one `espeak-ng --stdin` process that plays through the
//! default audio device. The child is killed when the utterance future is
//! dropped, which is how the narration driver cancels speech.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use stardust_narration::domain::backend::{SpeechBackend, SpeechError};
use stardust_narration::domain::voice::VoiceOptions;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// eSpeak's default speaking rate in words per minute.
const DEFAULT_WPM: f32 = 175.0;
/// eSpeak's default pitch on its 0-99 scale.
const DEFAULT_PITCH: f32 = 50.0;
/// eSpeak's default amplitude on its 0-200 scale.
const DEFAULT_AMPLITUDE: f32 = 100.0;

/// Command-line voice settings for one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EspeakArgs {
    /// `-s`: words per minute, 80-450.
    pub words_per_minute: u32,
    /// `-p`: pitch, 0-99.
    pub pitch: u32,
    /// `-a`: amplitude, 0-200.
    pub amplitude: u32,
}

impl EspeakArgs {
    /// Maps multiplier-style voice options onto eSpeak's scales.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_voice(voice: VoiceOptions) -> Self {
        let scale = |value: f32, default: f32, min: f32, max: f32| {
            (value * default).round().clamp(min, max) as u32
        };
        Self {
            words_per_minute: scale(voice.rate, DEFAULT_WPM, 80.0, 450.0),
            pitch: scale(voice.pitch, DEFAULT_PITCH, 0.0, 99.0),
            amplitude: scale(voice.volume, DEFAULT_AMPLITUDE, 0.0, 200.0),
        }
    }

    fn to_args(self) -> [String; 6] {
        [
            "-s".to_owned(),
            self.words_per_minute.to_string(),
            "-p".to_owned(),
            self.pitch.to_string(),
            "-a".to_owned(),
            self.amplitude.to_string(),
        ]
    }
}

/// Speech through an eSpeak-compatible command.
#[derive(Debug, Clone)]
pub struct EspeakBackend {
    program: PathBuf,
}

impl EspeakBackend {
    /// Uses `program`, either a path or a name looked up on `PATH`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The configured program.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolves the program to an executable, searching `PATH` for bare names.
    fn resolve(&self) -> Option<PathBuf> {
        match which::which(&self.program) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(program = %self.program.display(), error = %e, "synthesizer not found");
                None
            }
        }
    }
}

impl Default for EspeakBackend {
    fn default() -> Self {
        Self::new("espeak-ng")
    }
}

#[async_trait]
impl SpeechBackend for EspeakBackend {
    fn name(&self) -> &str {
        "espeak"
    }

    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    async fn speak(&self, text: &str, voice: VoiceOptions) -> Result<(), SpeechError> {
        let args = EspeakArgs::from_voice(voice);
        debug!(program = %self.program.display(), ?args, "spawning synthesizer");

        let mut child = Command::new(&self.program)
            .args(args.to_args())
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(SpeechError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(text.as_bytes()).await {
                // The synthesizer may exit without reading its input.
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(SpeechError::Io(e)),
                _ => {}
            }
        }

        let status = child.wait().await.map_err(SpeechError::Io)?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Exited(status.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bedtime_voice_maps_onto_espeak_scales() {
        // Act
        let args = EspeakArgs::from_voice(VoiceOptions::new(0.8, 1.1, 1.0));

        // Assert
        assert_eq!(
            args,
            EspeakArgs {
                words_per_minute: 140,
                pitch: 55,
                amplitude: 100,
            }
        );
    }

    #[test]
    fn test_muted_voice_has_zero_amplitude_and_clamped_rate() {
        let args = EspeakArgs::from_voice(VoiceOptions::new(0.1, 2.0, 0.0));
        assert_eq!(args.amplitude, 0);
        assert_eq!(args.words_per_minute, 80);
        assert_eq!(args.pitch, 99);
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let backend = EspeakBackend::new("stardust-no-such-synthesizer");
        assert!(!backend.is_available());

        let absolute = EspeakBackend::new("/definitely/missing/espeak-ng");
        assert!(!absolute.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_unavailable() {
        use std::os::unix::fs::PermissionsExt;

        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("espeak-ng");
        std::fs::write(&program, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o644)).unwrap();

        // Act
        let backend = EspeakBackend::new(&program);

        // Assert
        assert!(!backend.is_available());

        // Act
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Assert
        assert!(backend.is_available());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_speak_succeeds_when_program_exits_cleanly() {
        let backend = EspeakBackend::new("true");
        assert!(backend.is_available());
        backend
            .speak("Goodnight moon", VoiceOptions::default())
            .await
            .unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_speak_reports_failing_exit_status() {
        let backend = EspeakBackend::new("false");
        let result = backend.speak("Goodnight", VoiceOptions::default()).await;
        assert!(matches!(result, Err(SpeechError::Exited(_))));
    }

    #[tokio::test]
    async fn test_speak_reports_spawn_failure() {
        let backend = EspeakBackend::new("/definitely/missing/espeak-ng");
        let result = backend.speak("Goodnight", VoiceOptions::default()).await;
        assert!(matches!(result, Err(SpeechError::Spawn(_))));
    }
}
