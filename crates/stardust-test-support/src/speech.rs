//! Test speech backends — scripted `SpeechBackend` implementations for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use stardust_narration::domain::backend::{SpeechBackend, SpeechError};
use stardust_narration::domain::voice::VoiceOptions;
use tokio::sync::{oneshot, watch};

/// One call to `SpeechBackend::speak`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Text passed to the backend.
    pub text: String,
    /// Voice passed to the backend.
    pub voice: VoiceOptions,
}

type Finisher = oneshot::Sender<Result<(), String>>;

#[derive(Debug, Default)]
struct ManualState {
    requests: Vec<SpeechRequest>,
    pending: Vec<Finisher>,
}

/// A backend whose utterances stay in flight until the test finishes them.
///
/// Dropping an utterance future (cancellation) closes its finisher, so
/// `pending_count` only counts utterances that are still being spoken.
#[derive(Debug)]
pub struct ManualSpeechBackend {
    available: bool,
    state: Mutex<ManualState>,
    requested: watch::Sender<usize>,
}

impl ManualSpeechBackend {
    /// An available backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_availability(true)
    }

    /// A backend that reports no speech capability.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_availability(false)
    }

    fn with_availability(available: bool) -> Self {
        Self {
            available,
            state: Mutex::new(ManualState::default()),
            requested: watch::Sender::new(0),
        }
    }

    /// Every request received so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Texts of every request received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn spoken_texts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.text).collect()
    }

    /// Waits until at least `count` requests have been received.
    ///
    /// # Panics
    ///
    /// Panics if the backend is dropped while waiting.
    pub async fn wait_for_requests(&self, count: usize) {
        let mut rx = self.requested.subscribe();
        rx.wait_for(|received| *received >= count).await.unwrap();
    }

    /// Number of utterances still being spoken.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn pending_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .pending
            .iter()
            .filter(|f| !f.is_closed())
            .count()
    }

    /// Number of utterances whose future was dropped before they finished.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn cancelled_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .pending
            .iter()
            .filter(|f| f.is_closed())
            .count()
    }

    /// Finishes the oldest live utterance successfully. Returns false if
    /// nothing was being spoken.
    pub fn finish_current(&self) -> bool {
        self.resolve_current(Ok(()))
    }

    /// Fails the oldest live utterance with a backend error.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_current(&self, reason: &str) -> bool {
        self.resolve_current(Err(reason.to_owned()))
    }

    /// Finishes every live utterance successfully.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn finish_all(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let (live, cancelled): (Vec<Finisher>, Vec<Finisher>) =
            state.pending.drain(..).partition(|f| !f.is_closed());
        state.pending = cancelled;
        live.into_iter()
            .map(|finisher| finisher.send(Ok(())))
            .filter(Result::is_ok)
            .count()
    }

    fn resolve_current(&self, result: Result<(), String>) -> bool {
        let mut state = self.state.lock().unwrap();
        let Some(index) = state.pending.iter().position(|f| !f.is_closed()) else {
            return false;
        };
        state.pending.remove(index).send(result).is_ok()
    }
}

impl Default for ManualSpeechBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechBackend for ManualSpeechBackend {
    fn name(&self) -> &str {
        "manual"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn speak(&self, text: &str, voice: VoiceOptions) -> Result<(), SpeechError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().unwrap();
            state.requests.push(SpeechRequest {
                text: text.to_owned(),
                voice,
            });
            state.pending.push(tx);
            self.requested.send_replace(state.requests.len());
        }
        match rx.await {
            Ok(Ok(())) | Err(_) => Ok(()),
            Ok(Err(reason)) => Err(SpeechError::Backend(reason)),
        }
    }
}

/// A backend where every utterance takes the same amount of time.
#[derive(Debug)]
pub struct TimedSpeechBackend {
    duration: Duration,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl TimedSpeechBackend {
    /// Utterances last `duration` of runtime time.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechBackend for TimedSpeechBackend {
    fn name(&self) -> &str {
        "timed"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn speak(&self, text: &str, voice: VoiceOptions) -> Result<(), SpeechError> {
        self.requests.lock().unwrap().push(SpeechRequest {
            text: text.to_owned(),
            voice,
        });
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
