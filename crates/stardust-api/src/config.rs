//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use stardust_playback::application::controller::PlaybackConfig;

use crate::error::AppError;

/// Which speech backend narrates sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechBackendKind {
    /// An eSpeak-compatible command.
    Espeak,
    /// No audio; scenes auto-advance silently.
    Silent,
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Pause between narration completion and automatic advance.
    pub settle_delay: Duration,
    /// Speech backend.
    pub speech_backend: SpeechBackendKind,
    /// Program run by the eSpeak backend.
    pub espeak_program: PathBuf,
    /// Directory of extra story documents.
    pub story_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `HOST`, `PORT`, `SETTLE_DELAY_MS`, `SPEECH_BACKEND`,
    /// `ESPEAK_PROGRAM`, and `STORY_DIR`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but malformed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };
        let settle_delay = match lookup("SETTLE_DELAY_MS") {
            Some(raw) => raw.parse().map(Duration::from_millis).map_err(|e| {
                AppError::Config(format!("SETTLE_DELAY_MS must be milliseconds: {e}"))
            })?,
            None => PlaybackConfig::DEFAULT_SETTLE_DELAY,
        };
        let speech_backend = match lookup("SPEECH_BACKEND").as_deref() {
            None | Some("espeak") => SpeechBackendKind::Espeak,
            Some("silent") => SpeechBackendKind::Silent,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "SPEECH_BACKEND must be `espeak` or `silent`, got `{other}`"
                )));
            }
        };
        let espeak_program = lookup("ESPEAK_PROGRAM").map_or_else(
            || PathBuf::from("espeak-ng"),
            PathBuf::from,
        );
        let story_dir = lookup("STORY_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            settle_delay,
            speech_backend,
            espeak_program,
            story_dir,
        })
    }

    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// Defaults for new playback sessions.
    #[must_use]
    pub fn playback(&self) -> PlaybackConfig {
        PlaybackConfig {
            settle_delay: self.settle_delay,
            ..PlaybackConfig::default()
        }
    }
}
