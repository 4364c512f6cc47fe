//! Per-session event loop.
//!
//! Each session runs a [`PlaybackController`] on its own task. User
//! commands, narration completions, and settle-delay expiries are funnelled
//! into one `select!` loop, so exactly one handler runs at a time.

use std::collections::VecDeque;
use std::sync::Arc;

use stardust_core::clock::Clock;
use stardust_core::error::DomainError;
use stardust_narration::application::driver::NarrationDriver;
use stardust_narration::domain::backend::SpeechBackend;
use stardust_narration::domain::utterance::NarrationCompleted;
use stardust_story::domain::story::Story;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

pub use super::controller::PlaybackConfig;
use super::auto_advance::{AutoAdvanceDue, AutoAdvanceTimer};
use super::controller::PlaybackController;
use crate::domain::commands::PlaybackCommand;
use crate::domain::events::PlaybackEvent;
use crate::domain::outcome::Transition;
use crate::domain::snapshot::PlaybackSnapshot;

/// Most recent events kept for [`SessionHandle::history`].
pub const HISTORY_LIMIT: usize = 256;

const REQUEST_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

/// Result of executing a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReceipt {
    /// What the transition did.
    pub transition: Transition,
    /// State after the transition.
    pub snapshot: PlaybackSnapshot,
}

enum SessionRequest {
    Execute {
        command: PlaybackCommand,
        reply: oneshot::Sender<CommandReceipt>,
    },
    Snapshot {
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    History {
        reply: oneshot::Sender<Vec<PlaybackEvent>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle to a running session.
///
/// The session ends on [`shutdown`](Self::shutdown) or when every handle has
/// been dropped; either way narration and any pending auto-advance are
/// cancelled.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    requests: mpsc::Sender<SessionRequest>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Execute { command, .. } => f.debug_tuple("Execute").field(command).finish(),
            Self::Snapshot { .. } => f.write_str("Snapshot"),
            Self::History { .. } => f.write_str("History"),
            Self::Shutdown { .. } => f.write_str("Shutdown"),
        }
    }
}

impl SessionHandle {
    /// Session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Executes a user command.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session has ended.
    pub async fn execute(&self, command: PlaybackCommand) -> Result<CommandReceipt, DomainError> {
        self.request(|reply| SessionRequest::Execute { command, reply })
            .await
    }

    /// Current snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session has ended.
    pub async fn snapshot(&self) -> Result<PlaybackSnapshot, DomainError> {
        self.request(|reply| SessionRequest::Snapshot { reply }).await
    }

    /// The most recent [`HISTORY_LIMIT`] events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session has ended.
    pub async fn history(&self) -> Result<Vec<PlaybackEvent>, DomainError> {
        self.request(|reply| SessionRequest::History { reply }).await
    }

    /// Live events recorded from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Ends the session and waits for it to wind down. Ending a session
    /// that already ended is a no-op.
    pub async fn shutdown(&self) {
        let _ = self
            .request(|reply| SessionRequest::Shutdown { reply })
            .await;
    }

    /// Whether the session loop is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.requests.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionRequest,
    ) -> Result<T, DomainError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(build(reply))
            .await
            .map_err(|_| DomainError::SessionNotFound(self.session_id))?;
        response
            .await
            .map_err(|_| DomainError::SessionNotFound(self.session_id))
    }
}

/// Starts a session for `story` on a new task.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
#[must_use]
pub fn spawn_session(
    story: Arc<Story>,
    config: PlaybackConfig,
    backend: Arc<dyn SpeechBackend>,
    clock: Arc<dyn Clock>,
) -> SessionHandle {
    let session_id = Uuid::new_v4();
    let (request_tx, request_rx) = mpsc::channel(REQUEST_BUFFER);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    let (due_tx, due_rx) = mpsc::unbounded_channel();
    let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

    info!(
        %session_id,
        story = story.title(),
        scenes = story.scene_count(),
        voice_style = ?config.voice_style,
        "session started"
    );
    let controller = PlaybackController::new(
        session_id,
        story,
        config,
        NarrationDriver::new(backend, completion_tx),
        AutoAdvanceTimer::new(due_tx),
        clock,
    );
    let session = Session {
        controller,
        requests: request_rx,
        completions: completion_rx,
        due: due_rx,
        events: event_tx.clone(),
        journal: VecDeque::with_capacity(HISTORY_LIMIT),
    };
    tokio::spawn(session.run());

    SessionHandle {
        session_id,
        requests: request_tx,
        events: event_tx,
    }
}

struct Session {
    controller: PlaybackController,
    requests: mpsc::Receiver<SessionRequest>,
    completions: mpsc::UnboundedReceiver<NarrationCompleted>,
    due: mpsc::UnboundedReceiver<AutoAdvanceDue>,
    events: broadcast::Sender<PlaybackEvent>,
    journal: VecDeque<PlaybackEvent>,
}

impl Session {
    async fn run(mut self) {
        let mut shutdown_reply = None;
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(SessionRequest::Shutdown { reply }) => {
                        shutdown_reply = Some(reply);
                        break;
                    }
                    Some(SessionRequest::Execute { command, reply }) => self.execute(&command, reply),
                    Some(SessionRequest::Snapshot { reply }) => {
                        let _ = reply.send(self.controller.snapshot());
                    }
                    Some(SessionRequest::History { reply }) => {
                        let _ = reply.send(self.journal.iter().cloned().collect());
                    }
                    None => break,
                },
                Some(completed) = self.completions.recv() => {
                    let transition = self.controller.on_narration_completed(&completed);
                    self.commit();
                    debug!(session_id = %self.controller.session_id(), ?transition, "narration completion handled");
                }
                Some(due) = self.due.recv() => {
                    let transition = self.controller.on_auto_advance_due(&due);
                    self.commit();
                    debug!(session_id = %self.controller.session_id(), ?transition, "auto-advance handled");
                }
            }
        }

        self.controller.shutdown();
        self.commit();
        info!(session_id = %self.controller.session_id(), "session ended");
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    fn execute(&mut self, command: &PlaybackCommand, reply: oneshot::Sender<CommandReceipt>) {
        let transition = self.controller.execute(command);
        self.commit();
        let _ = reply.send(CommandReceipt {
            transition,
            snapshot: self.controller.snapshot(),
        });
    }

    /// Moves freshly recorded events into the journal and out to subscribers.
    fn commit(&mut self) {
        for event in self.controller.drain_events() {
            if self.journal.len() == HISTORY_LIMIT {
                self.journal.pop_front();
            }
            // No subscribers is fine.
            let _ = self.events.send(event.clone());
            self.journal.push_back(event);
        }
    }
}
