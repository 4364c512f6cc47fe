//! Registry of running playback sessions.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use stardust_core::clock::Clock;
use stardust_core::error::DomainError;
use stardust_narration::domain::backend::SpeechBackend;
use stardust_narration::domain::voice::VoiceStyle;
use stardust_story::domain::story::Story;
use tracing::info;
use uuid::Uuid;

use super::session::{PlaybackConfig, SessionHandle, spawn_session};

/// Running sessions, keyed by session ID. All sessions share one speech
/// backend and clock.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
    backend: Arc<dyn SpeechBackend>,
    clock: Arc<dyn Clock>,
    config: PlaybackConfig,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        clock: Arc<dyn Clock>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            backend,
            clock,
            config,
        }
    }

    /// Starts and registers a session for `story`. `voice_style` overrides
    /// the registry default.
    pub fn start(&self, story: Arc<Story>, voice_style: Option<VoiceStyle>) -> SessionHandle {
        let config = voice_style.map_or(self.config, |style| self.config.with_voice_style(style));
        let handle = spawn_session(
            story,
            config,
            Arc::clone(&self.backend),
            Arc::clone(&self.clock),
        );
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.session_id(), handle.clone());
        handle
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session is registered
    /// under `session_id`.
    pub fn get(&self, session_id: Uuid) -> Result<SessionHandle, DomainError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .cloned()
            .ok_or(DomainError::SessionNotFound(session_id))
    }

    /// Unregisters and shuts down a session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session is registered
    /// under `session_id`.
    pub async fn end(&self, session_id: Uuid) -> Result<(), DomainError> {
        let handle = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))?;
        handle.shutdown().await;
        Ok(())
    }

    /// IDs of every registered session.
    #[must_use]
    pub fn list(&self) -> Vec<Uuid> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true when no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shuts down every session.
    pub async fn shutdown_all(&self) {
        let handles: Vec<SessionHandle> = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        let count = handles.len();
        for handle in handles {
            handle.shutdown().await;
        }
        info!(sessions = count, "all playback sessions ended");
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
