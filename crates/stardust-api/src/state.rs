//! Shared application state.

use std::sync::Arc;

use stardust_playback::application::registry::SessionRegistry;
use stardust_story::application::catalog::StoryCatalog;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Stories available for playback.
    pub catalog: Arc<StoryCatalog>,
    /// Running playback sessions.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(catalog: StoryCatalog, sessions: SessionRegistry) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(sessions),
        }
    }
}
