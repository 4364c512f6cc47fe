//! Settle-delay timer for automatic scene advance.
//!
//! At most one advance is armed. Expiries are delivered on a channel owned by
//! the session loop and carry the ticket they were armed with, so an expiry
//! that raced a [`disarm`](AutoAdvanceTimer::disarm) is recognised and
//! dropped by [`take_if_current`](AutoAdvanceTimer::take_if_current).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Expiry of an armed settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvanceDue {
    /// Ticket issued by [`AutoAdvanceTimer::arm`].
    pub ticket: u64,
    /// Event that scheduled the advance.
    pub causation_id: Uuid,
    /// Correlation ID of the command that started the narration.
    pub correlation_id: Uuid,
}

#[derive(Debug)]
struct Armed {
    ticket: u64,
    task: JoinHandle<()>,
}

/// One-shot, cancellable settle-delay timer.
#[derive(Debug)]
pub struct AutoAdvanceTimer {
    due: mpsc::UnboundedSender<AutoAdvanceDue>,
    armed: Option<Armed>,
    last_ticket: u64,
}

impl AutoAdvanceTimer {
    /// Creates a disarmed timer that reports expiries on `due`.
    #[must_use]
    pub fn new(due: mpsc::UnboundedSender<AutoAdvanceDue>) -> Self {
        Self {
            due,
            armed: None,
            last_ticket: 0,
        }
    }

    /// Arms the timer, replacing any advance already armed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn arm(&mut self, delay: Duration, causation_id: Uuid, correlation_id: Uuid) -> u64 {
        self.disarm();
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        let due = self.due.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A closed channel means the session has ended.
            let _ = due.send(AutoAdvanceDue {
                ticket,
                causation_id,
                correlation_id,
            });
        });
        debug!(ticket, ?delay, "auto-advance armed");
        self.armed = Some(Armed { ticket, task });
        ticket
    }

    /// Cancels the armed advance. Returns false if nothing was armed.
    pub fn disarm(&mut self) -> bool {
        let Some(armed) = self.armed.take() else {
            return false;
        };
        armed.task.abort();
        debug!(ticket = armed.ticket, "auto-advance disarmed");
        true
    }

    /// Whether an advance is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Consumes `due` if it belongs to the armed advance.
    pub fn take_if_current(&mut self, due: &AutoAdvanceDue) -> bool {
        match &self.armed {
            Some(armed) if armed.ticket == due.ticket => {
                self.armed = None;
                true
            }
            _ => {
                debug!(ticket = due.ticket, "discarding stale auto-advance");
                false
            }
        }
    }
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
