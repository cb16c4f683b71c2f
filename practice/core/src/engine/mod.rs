//! Playback Engine
//!
//! The engine owns one practice from fetch to completion. It applies events
//! through the pure [`transition`] function and performs the resulting
//! effects: cue dispatch, outbound [`PlaybackMessage`]s, and the one-time
//! hand-off of the [`SessionSummary`] to the recorder.
//!
//! # Driving the Engine
//!
//! The engine is synchronous. Something has to call [`PlaybackEngine::tick`]
//! once per second and forward commands; normally that is a
//! [`PracticeRunner`], which multiplexes a [`Clock`] and a command channel in
//! one loop so ticks and commands are applied strictly in arrival order.
//!
//! ```ignore
//! use practice_core::{engine::{EngineOptions, PlaybackEngine, PracticeRunner}, SilentCues};
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let engine = PlaybackEngine::new("sun-salutation".into(), settings, EngineOptions::default(),
//!     Box::new(SilentCues), recorder, tx);
//! let (handle, task) = PracticeRunner::new(engine, source).spawn();
//! handle.pause();
//! ```

mod clock;
mod runner;
mod state;
mod transition;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cue::{CueDispatcher, CueGate};
use crate::events::PlaybackCommand;
use crate::messages::{PlaybackMessage, PlaybackSnapshot};
use crate::recorder::{SessionRecorder, SessionSummary};
use crate::sequence::{Sequence, SequenceId};
use crate::settings::{SettingUpdate, Settings};
use crate::source::FetchError;

pub use clock::{Clock, TICK_PERIOD};
pub use runner::{command_channel, PracticeHandle, PracticeOutcome, PracticeRunner};
pub use state::{Cursor, Phase, PlaybackState, PlaybackStatus};
pub use transition::{transition, Effect, PlaybackEvent, Step};

/// Engine construction options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Count down the preparation time before the first pose
    pub lead_in: bool,
    /// Start with cues muted
    pub start_muted: bool,
}

/// Owner of a single practice's playback state
pub struct PlaybackEngine {
    /// Sequence being practised
    sequence_id: SequenceId,
    /// Current state; replaced wholesale on every step
    state: PlaybackState,
    /// Cue output
    cues: CueGate,
    /// Completed-session sink
    recorder: Arc<dyn SessionRecorder>,
    /// Channel to the surface
    tx: mpsc::UnboundedSender<PlaybackMessage>,
    /// Summary handed to the recorder, once completed
    summary: Option<SessionSummary>,
    /// In-flight recorder save
    pending_save: Option<JoinHandle<()>>,
    /// Last fetch error, for the failure message
    last_error: Option<String>,
}

impl PlaybackEngine {
    /// Create an engine in `Loading` for `sequence_id`
    pub fn new(
        sequence_id: SequenceId,
        settings: Settings,
        options: EngineOptions,
        cues: Box<dyn CueDispatcher>,
        recorder: Arc<dyn SessionRecorder>,
        tx: mpsc::UnboundedSender<PlaybackMessage>,
    ) -> Self {
        let state = PlaybackState::new(settings)
            .with_lead_in(options.lead_in)
            .with_muted(options.start_muted);
        Self {
            sequence_id,
            state,
            cues: CueGate::new(cues),
            recorder,
            tx,
            summary: None,
            pending_save: None,
            last_error: None,
        }
    }

    /// Sequence this engine plays
    pub fn sequence_id(&self) -> &SequenceId {
        &self.sequence_id
    }

    /// Current state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Current state as a surface snapshot
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.snapshot()
    }

    /// Summary handed to the recorder, once completed
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Cue gate (for dispatch statistics)
    pub fn cues(&self) -> &CueGate {
        &self.cues
    }

    /// Apply a fetch result
    ///
    /// Ignored unless the engine is still `Loading` (for example after an
    /// exit during the fetch).
    pub fn loaded(&mut self, result: Result<Sequence, FetchError>) {
        match result {
            Ok(sequence) => {
                tracing::info!(
                    sequence_id = %self.sequence_id,
                    poses = sequence.len(),
                    total_seconds = sequence.total_duration_seconds(),
                    "Sequence loaded"
                );
                self.apply(PlaybackEvent::Loaded(Arc::new(sequence)));
            }
            Err(e) => {
                tracing::warn!(sequence_id = %self.sequence_id, "Sequence fetch failed: {}", e);
                let kind = e.kind();
                self.last_error = Some(e.to_string());
                self.apply(PlaybackEvent::LoadFailed(kind));
            }
        }
    }

    /// One clock period elapsed
    pub fn tick(&mut self) {
        self.apply(PlaybackEvent::Tick);
    }

    /// Apply a surface command
    pub fn handle(&mut self, command: PlaybackCommand) {
        tracing::debug!(command = command.name(), "Command");
        self.apply(PlaybackEvent::Command(command));
    }

    /// Freeze the countdown
    pub fn pause(&mut self) {
        self.handle(PlaybackCommand::Pause);
    }

    /// Continue the countdown
    pub fn resume(&mut self) {
        self.handle(PlaybackCommand::Resume);
    }

    /// Pause when running, resume when paused
    pub fn toggle_pause(&mut self) {
        self.handle(PlaybackCommand::TogglePause);
    }

    /// Jump to the next pose (no-op on the last)
    pub fn skip_forward(&mut self) {
        self.handle(PlaybackCommand::SkipForward);
    }

    /// Jump to the previous pose (no-op on the first)
    pub fn skip_backward(&mut self) {
        self.handle(PlaybackCommand::SkipBackward);
    }

    /// Leave without recording
    pub fn exit(&mut self) {
        self.handle(PlaybackCommand::Exit);
    }

    /// Flip the cue mute flag
    pub fn toggle_mute(&mut self) {
        self.handle(PlaybackCommand::ToggleMute);
    }

    /// Change a setting
    pub fn update_setting(&mut self, update: SettingUpdate) {
        self.handle(PlaybackCommand::UpdateSetting { update });
    }

    /// Wait for an in-flight recorder save to finish
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending_save.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Session save task failed: {}", e);
            }
        }
    }

    /// Apply an event and perform its effects
    fn apply(&mut self, event: PlaybackEvent) {
        let step = transition(&self.state, event);
        let changed = !step.is_noop() || step.state.phase() != self.state.phase();
        self.state = step.state;

        for effect in step.effects {
            self.perform(effect);
        }

        if changed {
            self.send(PlaybackMessage::StateChanged {
                snapshot: self.state.snapshot(),
            });
        }
    }

    fn perform(&mut self, effect: Effect) {
        let muted = self.state.muted();
        let volume = self.state.settings().volume;

        match effect {
            Effect::Loaded => {
                if let Some(sequence) = self.state.sequence() {
                    let msg = PlaybackMessage::Loaded {
                        name: sequence.name().to_string(),
                        pose_count: sequence.len(),
                        total_seconds: sequence.total_duration_seconds(),
                    };
                    self.send(msg);
                }
            }
            Effect::LeadIn { seconds } => {
                self.send(PlaybackMessage::LeadIn { seconds });
            }
            Effect::PoseChanged { index, reason } => {
                let pose = self.state.sequence().and_then(|s| s.pose(index)).cloned();
                if let Some(pose) = pose {
                    tracing::debug!(index, pose = %pose.name, ?reason, "Pose changed");
                    self.send(PlaybackMessage::PoseChanged {
                        index,
                        pose,
                        reason,
                    });
                }
            }
            Effect::Warning { next_index } => {
                self.cues.on_warning(muted, volume);
                let next = self
                    .state
                    .sequence()
                    .and_then(|s| s.pose(next_index))
                    .cloned();
                if let Some(next) = next {
                    self.send(PlaybackMessage::Warning { next_index, next });
                }
            }
            Effect::TransitionCue => self.cues.on_transition(muted, volume),
            Effect::Paused => self.send(PlaybackMessage::Paused),
            Effect::Resumed => self.send(PlaybackMessage::Resumed),
            Effect::Completed => self.complete(),
            Effect::Failed(kind) => {
                let message = self
                    .last_error
                    .clone()
                    .unwrap_or_else(|| kind.label().to_string());
                self.send(PlaybackMessage::Failed { kind, message });
            }
            Effect::Exited => {
                tracing::info!(sequence_id = %self.sequence_id, "Practice exited");
                self.send(PlaybackMessage::Exited);
            }
            Effect::MuteChanged(muted) => self.send(PlaybackMessage::MuteChanged { muted }),
            Effect::SettingChanged { key, clamped } => {
                if clamped {
                    tracing::debug!(%key, "Setting value clamped into range");
                }
                self.send(PlaybackMessage::SettingChanged {
                    key,
                    settings: *self.state.settings(),
                    clamped,
                });
            }
        }
    }

    /// Declare completion and hand the summary off
    fn complete(&mut self) {
        if self.summary.is_some() {
            return;
        }
        let Some(sequence) = self.state.sequence() else {
            return;
        };
        let summary = SessionSummary::for_sequence(sequence, Utc::now());
        tracing::info!(
            sequence_id = %summary.sequence_id,
            duration_minutes = summary.duration_minutes,
            poses_completed = summary.poses_completed,
            "Practice completed"
        );
        self.summary = Some(summary.clone());
        self.send(PlaybackMessage::Completed {
            summary: summary.clone(),
        });
        self.spawn_save(summary);
    }

    fn spawn_save(&mut self, summary: SessionSummary) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::error!("No async runtime; session summary not saved");
            return;
        };
        let recorder = Arc::clone(&self.recorder);
        self.pending_save = Some(runtime.spawn(async move {
            if let Err(e) = recorder.save(summary).await {
                tracing::warn!(recorder = recorder.name(), "Failed to save session: {:#}", e);
            }
        }));
    }

    fn send(&self, msg: PlaybackMessage) {
        if self.tx.send(msg).is_err() {
            tracing::trace!("Surface channel closed; message dropped");
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            tracing::debug!(
                sequence_id = %self.sequence_id,
                "Engine dropped mid-practice; treating as exit"
            );
            self.exit();
        }
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("sequence_id", &self.sequence_id)
            .field("state", &self.state)
            .field("cues", &self.cues)
            .field("recorder", &self.recorder.name())
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}
