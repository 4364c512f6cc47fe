//! The scene playback controller.
//!
//! Every transition and every asynchronous signal (narration completion,
//! settle-delay expiry) is handled by `&mut self`, so handlers never
//! interleave. State changes only by recording a [`PlaybackEvent`] and
//! applying it to [`PlaybackState`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use stardust_core::clock::Clock;
use stardust_core::event::EventMetadata;
use stardust_narration::application::driver::NarrationDriver;
use stardust_narration::domain::utterance::NarrationCompleted;
use stardust_narration::domain::voice::{VoiceOptions, VoiceStyle};
use stardust_story::domain::story::Story;
use tracing::{debug, info};
use uuid::Uuid;

use super::auto_advance::{AutoAdvanceDue, AutoAdvanceTimer};
use crate::domain::commands::{PlaybackCommand, PlaybackCommandKind};
use crate::domain::events::{PlaybackEvent, PlaybackEventKind, SceneTrigger, StopReason};
use crate::domain::outcome::{IgnoredReason, Transition};
use crate::domain::snapshot::PlaybackSnapshot;
use crate::domain::state::PlaybackState;

/// Per-session playback settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Pause between narration completion and the automatic advance.
    pub settle_delay: Duration,
    /// Reading voice.
    pub voice_style: VoiceStyle,
}

impl PlaybackConfig {
    /// One second, long enough to avoid an abrupt cut.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

    /// Same settings with another voice.
    #[must_use]
    pub fn with_voice_style(self, voice_style: VoiceStyle) -> Self {
        Self {
            voice_style,
            ..self
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            voice_style: VoiceStyle::default(),
        }
    }
}

/// Causal context of the utterance in flight.
#[derive(Debug, Clone, Copy)]
struct NarrationContext {
    correlation_id: Uuid,
    started_event_id: Uuid,
}

/// State machine for one viewing session.
pub struct PlaybackController {
    session_id: Uuid,
    story: Arc<Story>,
    config: PlaybackConfig,
    voice: VoiceOptions,
    state: PlaybackState,
    driver: NarrationDriver,
    timer: AutoAdvanceTimer,
    clock: Arc<dyn Clock>,
    narration: Option<NarrationContext>,
    uncommitted_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Creates a controller on the first scene, paused and unmuted.
    #[must_use]
    pub fn new(
        session_id: Uuid,
        story: Arc<Story>,
        config: PlaybackConfig,
        mut driver: NarrationDriver,
        timer: AutoAdvanceTimer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        driver.set_muted(false);
        Self {
            session_id,
            state: PlaybackState::new(story.scene_count()),
            story,
            voice: config.voice_style.options(),
            config,
            driver,
            timer,
            clock,
            narration: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The story being played.
    #[must_use]
    pub fn story(&self) -> &Arc<Story> {
        &self.story
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Read-only view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot::capture(self.session_id, &self.story, &self.state)
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[PlaybackEvent] {
        &self.uncommitted_events
    }

    /// Takes the events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Dispatches a user command.
    pub fn execute(&mut self, command: &PlaybackCommand) -> Transition {
        let correlation_id = command.correlation_id;
        match command.kind {
            PlaybackCommandKind::TogglePlayback => self.toggle_playback(correlation_id),
            PlaybackCommandKind::NextScene => self.next_scene(correlation_id),
            PlaybackCommandKind::PrevScene => self.prev_scene(correlation_id),
            PlaybackCommandKind::ToggleMute => self.toggle_mute(correlation_id),
        }
    }

    /// Starts narrating the current scene, or stops narration in flight.
    ///
    /// Starting cancels any pending auto-advance.
    pub fn toggle_playback(&mut self, correlation_id: Uuid) -> Transition {
        if self.stop_narration(StopReason::Paused, correlation_id) {
            info!(
                session_id = %self.session_id,
                scene_index = self.state.current_index(),
                "playback paused"
            );
            return Transition::Applied;
        }

        self.cancel_auto_advance(correlation_id);
        let scene_index = self.state.current_index();
        let text = self
            .story
            .scene(scene_index)
            .map_or("", |scene| scene.narration_text.as_str());
        let utterance_id = self.driver.speak(text, self.voice);
        let volume = self.voice.for_mute_state(self.state.is_muted()).volume;
        let started_event_id = self.record(
            PlaybackEventKind::NarrationStarted {
                scene_index,
                utterance_id,
                volume,
            },
            correlation_id,
            correlation_id,
        );
        self.narration = Some(NarrationContext {
            correlation_id,
            started_event_id,
        });
        info!(
            session_id = %self.session_id,
            scene_index,
            utterance_id = %utterance_id,
            %correlation_id,
            "playback started"
        );
        Transition::Applied
    }

    /// Moves to the following scene. Ignored at the last scene.
    pub fn next_scene(&mut self, correlation_id: Uuid) -> Transition {
        if self.state.is_last_scene() {
            debug!(session_id = %self.session_id, "next scene ignored at last scene");
            return Transition::Ignored(IgnoredReason::AtLastScene);
        }
        let from = self.state.current_index();
        self.change_scene(from, from + 1, SceneTrigger::Next, correlation_id);
        Transition::Applied
    }

    /// Moves to the preceding scene. Ignored at the first scene.
    pub fn prev_scene(&mut self, correlation_id: Uuid) -> Transition {
        if self.state.is_first_scene() {
            debug!(session_id = %self.session_id, "previous scene ignored at first scene");
            return Transition::Ignored(IgnoredReason::AtFirstScene);
        }
        let from = self.state.current_index();
        self.change_scene(from, from - 1, SceneTrigger::Previous, correlation_id);
        Transition::Applied
    }

    /// Flips the mute state. Narration in flight is interrupted rather than
    /// re-voiced.
    pub fn toggle_mute(&mut self, correlation_id: Uuid) -> Transition {
        self.stop_narration(StopReason::MuteToggled, correlation_id);
        self.cancel_auto_advance(correlation_id);
        let muted = !self.state.is_muted();
        self.driver.set_muted(muted);
        self.record(
            PlaybackEventKind::MuteToggled { muted },
            correlation_id,
            correlation_id,
        );
        info!(session_id = %self.session_id, muted, %correlation_id, "mute toggled");
        Transition::Applied
    }

    /// Handles a narration completion. Completions for anything but the
    /// utterance in flight are stale.
    ///
    /// Schedules the automatic advance unless this is the last scene.
    pub fn on_narration_completed(&mut self, completed: &NarrationCompleted) -> Transition {
        if !self.driver.acknowledge(completed) {
            return Transition::Ignored(IgnoredReason::StaleNarration);
        }
        let context = self.narration.take().unwrap_or(NarrationContext {
            correlation_id: Uuid::nil(),
            started_event_id: Uuid::nil(),
        });
        let scene_index = self.state.current_index();
        let finished_event_id = self.record(
            PlaybackEventKind::NarrationFinished {
                scene_index,
                utterance_id: completed.utterance_id,
                outcome: completed.outcome.clone(),
            },
            context.correlation_id,
            context.started_event_id,
        );
        info!(
            session_id = %self.session_id,
            scene_index,
            utterance_id = %completed.utterance_id,
            "narration finished"
        );

        if !self.state.is_last_scene() {
            let delay = self.config.settle_delay;
            self.timer.arm(delay, finished_event_id, context.correlation_id);
            self.record(
                PlaybackEventKind::AutoAdvanceScheduled {
                    from_index: scene_index,
                    delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                },
                context.correlation_id,
                finished_event_id,
            );
        }
        Transition::Applied
    }

    /// Handles a settle-delay expiry. Expiries of cancelled advances are
    /// stale.
    pub fn on_auto_advance_due(&mut self, due: &AutoAdvanceDue) -> Transition {
        if !self.timer.take_if_current(due) {
            return Transition::Ignored(IgnoredReason::StaleAutoAdvance);
        }
        if self.state.is_last_scene() {
            return Transition::Ignored(IgnoredReason::AtLastScene);
        }
        let from = self.state.current_index();
        self.record(
            PlaybackEventKind::SceneChanged {
                from,
                to: from + 1,
                trigger: SceneTrigger::AutoAdvance,
            },
            due.correlation_id,
            due.causation_id,
        );
        info!(session_id = %self.session_id, from, to = from + 1, "auto-advanced");
        Transition::Applied
    }

    /// Cancels narration in flight and any pending auto-advance.
    pub fn shutdown(&mut self) {
        let correlation_id = Uuid::new_v4();
        self.stop_narration(StopReason::SessionEnded, correlation_id);
        self.cancel_auto_advance(correlation_id);
        debug!(session_id = %self.session_id, "controller shut down");
    }

    fn change_scene(
        &mut self,
        from: usize,
        to: usize,
        trigger: SceneTrigger,
        correlation_id: Uuid,
    ) {
        self.stop_narration(StopReason::SceneChanged, correlation_id);
        self.cancel_auto_advance(correlation_id);
        self.record(
            PlaybackEventKind::SceneChanged { from, to, trigger },
            correlation_id,
            correlation_id,
        );
        info!(session_id = %self.session_id, from, to, %correlation_id, "scene changed");
    }

    /// Cancels the utterance in flight, if any. Returns whether one was.
    fn stop_narration(&mut self, reason: StopReason, correlation_id: Uuid) -> bool {
        let Some(utterance_id) = self.driver.current() else {
            return false;
        };
        self.driver.cancel();
        self.narration = None;
        self.record(
            PlaybackEventKind::NarrationStopped {
                scene_index: self.state.current_index(),
                utterance_id,
                reason,
            },
            correlation_id,
            correlation_id,
        );
        true
    }

    fn cancel_auto_advance(&mut self, correlation_id: Uuid) {
        if self.timer.disarm() {
            self.record(
                PlaybackEventKind::AutoAdvanceCancelled {
                    from_index: self.state.current_index(),
                },
                correlation_id,
                correlation_id,
            );
        }
    }

    /// Stamps, applies, and queues an event. Returns its ID.
    fn record(
        &mut self,
        kind: PlaybackEventKind,
        correlation_id: Uuid,
        causation_id: Uuid,
    ) -> Uuid {
        let event = PlaybackEvent {
            metadata: EventMetadata {
                event_id: Uuid::now_v7(),
                event_type: kind.event_type().to_owned(),
                session_id: self.session_id,
                sequence_number: self.state.version() + 1,
                correlation_id,
                causation_id,
                occurred_at: self.clock.now(),
            },
            kind,
        };
        self.state.apply(&event.kind);
        let event_id = event.metadata.event_id;
        self.uncommitted_events.push(event);
        event_id
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("session_id", &self.session_id)
            .field("story", &self.story.title())
            .field("state", &self.state)
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}
