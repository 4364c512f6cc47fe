//! The narration driver.
//!
//! At most one utterance is in flight. Completions are delivered on an
//! unbounded channel owned by the caller, so they are always observed on the
//! caller's next turn and never from inside `speak`. A cancelled utterance
//! never produces a completion that [`NarrationDriver::acknowledge`] accepts.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::backend::SpeechBackend;
use crate::domain::utterance::{NarrationCompleted, NarrationOutcome, UtteranceId};
use crate::domain::voice::VoiceOptions;

/// Whether the driver can produce audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechCapability {
    /// A working backend is attached.
    Available,
    /// No backend; every utterance completes immediately and silently.
    Unavailable,
}

struct InFlight {
    id: UtteranceId,
    task: Option<JoinHandle<()>>,
}

/// Drives a [`SpeechBackend`] one utterance at a time.
pub struct NarrationDriver {
    backend: Option<Arc<dyn SpeechBackend>>,
    completions: mpsc::UnboundedSender<NarrationCompleted>,
    in_flight: Option<InFlight>,
    muted: bool,
    last_id: u64,
}

impl NarrationDriver {
    /// Builds a driver over `backend`, probing its availability once.
    ///
    /// An unavailable backend is discarded and the driver runs degraded.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        completions: mpsc::UnboundedSender<NarrationCompleted>,
    ) -> Self {
        let backend = if backend.is_available() {
            info!(backend = backend.name(), "speech output available");
            Some(backend)
        } else {
            warn!(
                backend = backend.name(),
                "speech output unavailable; scenes will advance silently"
            );
            None
        };
        Self {
            backend,
            completions,
            in_flight: None,
            muted: false,
            last_id: 0,
        }
    }

    /// Builds a driver with no speech capability.
    #[must_use]
    pub fn silent(completions: mpsc::UnboundedSender<NarrationCompleted>) -> Self {
        Self {
            backend: None,
            completions,
            in_flight: None,
            muted: false,
            last_id: 0,
        }
    }

    /// Capability decided at construction.
    #[must_use]
    pub fn capability(&self) -> SpeechCapability {
        if self.backend.is_some() {
            SpeechCapability::Available
        } else {
            SpeechCapability::Unavailable
        }
    }

    /// The utterance currently in flight, if any.
    #[must_use]
    pub fn current(&self) -> Option<UtteranceId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Whether an utterance is in flight.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the next utterance will be muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Sets the mute state sampled by the next [`speak`](Self::speak).
    /// An utterance already in flight keeps its volume.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Starts narrating `text`, cancelling any utterance in flight.
    ///
    /// Empty text, or a driver without speech capability, synthesizes
    /// nothing and queues the completion immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime while a backend is attached.
    pub fn speak(&mut self, text: &str, options: VoiceOptions) -> UtteranceId {
        self.cancel();
        self.last_id += 1;
        let id = UtteranceId::from_raw(self.last_id);
        let voice = if self.muted {
            options.silenced()
        } else {
            options
        };

        let task = match &self.backend {
            _ if text.trim().is_empty() => {
                debug!(utterance_id = %id, "nothing to say");
                self.queue_completion(id, NarrationOutcome::NothingToSay);
                None
            }
            None => {
                debug!(utterance_id = %id, "no speech output; completing silently");
                self.queue_completion(id, NarrationOutcome::Unavailable);
                None
            }
            Some(backend) => {
                let backend = Arc::clone(backend);
                let completions = self.completions.clone();
                let text = text.to_owned();
                debug!(utterance_id = %id, volume = voice.volume, "utterance started");
                Some(tokio::spawn(async move {
                    let outcome = match backend.speak(&text, voice).await {
                        Ok(()) => NarrationOutcome::Spoken,
                        Err(e) => {
                            warn!(utterance_id = %id, error = %e, "speech failed; treating utterance as complete");
                            NarrationOutcome::Failed {
                                reason: e.to_string(),
                            }
                        }
                    };
                    // A closed channel means the session has ended.
                    let _ = completions.send(NarrationCompleted {
                        utterance_id: id,
                        outcome,
                    });
                }))
            }
        };

        self.in_flight = Some(InFlight { id, task });
        id
    }

    /// Stops the utterance in flight. Returns false if nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        if let Some(task) = in_flight.task {
            task.abort();
        }
        debug!(utterance_id = %in_flight.id, "utterance cancelled");
        true
    }

    /// Accepts a completion if it belongs to the utterance in flight, which
    /// then ends. Completions of cancelled or superseded utterances return
    /// false.
    pub fn acknowledge(&mut self, completed: &NarrationCompleted) -> bool {
        match &self.in_flight {
            Some(in_flight) if in_flight.id == completed.utterance_id => {
                self.in_flight = None;
                true
            }
            _ => {
                debug!(utterance_id = %completed.utterance_id, "discarding stale completion");
                false
            }
        }
    }

    fn queue_completion(&self, utterance_id: UtteranceId, outcome: NarrationOutcome) {
        let _ = self.completions.send(NarrationCompleted {
            utterance_id,
            outcome,
        });
    }
}

impl Drop for NarrationDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for NarrationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationDriver")
            .field("capability", &self.capability())
            .field("current", &self.current())
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::backend::SpeechError;

    /// Backend whose utterances last a fixed time and are recorded.
    #[derive(Default)]
    struct SleepyBackend {
        available: bool,
        fail: bool,
        spoken: Mutex<Vec<(String, VoiceOptions)>>,
    }

    impl SleepyBackend {
        fn available() -> Arc<Self> {
            Arc::new(Self {
                available: true,
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl SpeechBackend for SleepyBackend {
        fn name(&self) -> &str {
            "sleepy"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        async fn speak(&self, text: &str, voice: VoiceOptions) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push((text.to_owned(), voice));
            tokio::time::sleep(Duration::from_secs(2)).await;
            if self.fail {
                return Err(SpeechError::Backend("device lost".into()));
            }
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_reports_single_completion() {
        // Arrange
        let backend = SleepyBackend::available();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(backend.clone(), tx);

        // Act
        let id = driver.speak("Hello moon", VoiceOptions::default());
        let completed = rx.recv().await.unwrap();

        // Assert
        assert_eq!(driver.capability(), SpeechCapability::Available);
        assert_eq!(completed.utterance_id, id);
        assert_eq!(completed.outcome, NarrationOutcome::Spoken);
        assert!(driver.acknowledge(&completed));
        assert!(!driver.is_speaking());
        assert_eq!(backend.spoken.lock().unwrap()[0].0, "Hello moon");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_completion() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(SleepyBackend::available(), tx);
        driver.speak("Hello", VoiceOptions::default());

        // Act
        assert!(driver.cancel());
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Assert
        assert!(rx.try_recv().is_err());
        assert!(!driver.is_speaking());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::silent(tx);
        assert!(!driver.cancel());
        assert!(!driver.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_speak_supersedes_previous_utterance() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(SleepyBackend::available(), tx);
        let first = driver.speak("one", VoiceOptions::default());

        // Act
        let second = driver.speak("two", VoiceOptions::default());
        let completed = rx.recv().await.unwrap();

        // Assert
        assert_ne!(first, second);
        assert_eq!(completed.utterance_id, second);
        assert_eq!(driver.current(), Some(second));
    }

    #[tokio::test]
    async fn test_acknowledge_rejects_stale_completion() {
        // Arrange
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::silent(tx);
        let current = driver.speak("hi", VoiceOptions::default());
        let stale = NarrationCompleted {
            utterance_id: UtteranceId::from_raw(current.value() + 100),
            outcome: NarrationOutcome::Spoken,
        };

        // Act & Assert
        assert!(!driver.acknowledge(&stale));
        assert_eq!(driver.current(), Some(current));
    }

    #[tokio::test]
    async fn test_empty_text_completes_without_backend_call() {
        // Arrange
        let backend = SleepyBackend::available();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(backend.clone(), tx);

        // Act
        let id = driver.speak("   ", VoiceOptions::default());

        // Assert
        let completed = rx.recv().await.unwrap();
        assert_eq!(completed.utterance_id, id);
        assert_eq!(completed.outcome, NarrationOutcome::NothingToSay);
        assert!(backend.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_backend_degrades_to_immediate_completion() {
        // Arrange
        let backend = Arc::new(SleepyBackend::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(backend.clone(), tx);

        // Act
        let id = driver.speak("Hello", VoiceOptions::default());

        // Assert
        assert_eq!(driver.capability(), SpeechCapability::Unavailable);
        let completed = rx.recv().await.unwrap();
        assert_eq!(completed.utterance_id, id);
        assert_eq!(completed.outcome, NarrationOutcome::Unavailable);
        assert!(backend.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_failure_still_completes() {
        // Arrange
        let backend = Arc::new(SleepyBackend {
            available: true,
            fail: true,
            ..SleepyBackend::default()
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(backend, tx);

        // Act
        driver.speak("Hello", VoiceOptions::default());
        let completed = rx.recv().await.unwrap();

        // Assert
        assert!(matches!(completed.outcome, NarrationOutcome::Failed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mute_is_sampled_when_speaking_starts() {
        // Arrange
        let backend = SleepyBackend::available();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = NarrationDriver::new(backend.clone(), tx);

        // Act
        driver.set_muted(true);
        driver.speak("quiet", VoiceOptions::default());
        rx.recv().await.unwrap();
        driver.set_muted(false);
        driver.speak("loud", VoiceOptions::default());
        rx.recv().await.unwrap();

        // Assert
        let spoken = backend.spoken.lock().unwrap();
        assert!(spoken[0].1.volume.abs() < f32::EPSILON);
        assert!((spoken[1].1.volume - 1.0).abs() < f32::EPSILON);
    }
}
