//! Practice Runner
//!
//! Drives a [`PlaybackEngine`] from a single async loop. The loop is the
//! only place ticks and commands meet, and it handles one at a time, so the
//! engine sees them strictly in arrival order. A command that is already
//! queued when a tick comes due is applied first (`biased` select).
//!
//! The runner also owns the [`Clock`]: it acquires one when the engine
//! enters a counting phase and drops it as soon as the engine reaches a
//! terminal state.
//!
//! Closing the command channel counts as leaving the practice. A surface
//! that is torn down without sending `Exit` still cancels cleanly and the
//! recorder is never called.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use super::clock::Clock;
use super::state::{Phase, PlaybackStatus};
use super::PlaybackEngine;
use crate::events::PlaybackCommand;
use crate::recorder::SessionSummary;
use crate::settings::SettingUpdate;
use crate::source::{FailureKind, SequenceSource};

/// How long a finished runner waits for the recorder before returning
const SAVE_GRACE: Duration = Duration::from_secs(5);

/// How a practice ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PracticeOutcome {
    /// Final pose expired; this summary went to the recorder
    Completed(SessionSummary),
    /// Player left (explicitly or by dropping the handle)
    Exited,
    /// The sequence could not be fetched
    Failed(FailureKind),
}

/// Create a connected command handle and receiver
#[must_use]
pub fn command_channel() -> (PracticeHandle, mpsc::UnboundedReceiver<PlaybackCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PracticeHandle { tx }, rx)
}

/// Surface-side handle for sending commands to a running practice
///
/// All methods are synchronous and return `false` once the practice has
/// ended. Dropping every clone of the handle exits the practice.
#[derive(Clone, Debug)]
pub struct PracticeHandle {
    tx: mpsc::UnboundedSender<PlaybackCommand>,
}

impl PracticeHandle {
    /// Send any command
    pub fn send(&self, command: PlaybackCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Freeze the countdown
    pub fn pause(&self) -> bool {
        self.send(PlaybackCommand::Pause)
    }

    /// Continue the countdown
    pub fn resume(&self) -> bool {
        self.send(PlaybackCommand::Resume)
    }

    /// Pause or resume
    pub fn toggle_pause(&self) -> bool {
        self.send(PlaybackCommand::TogglePause)
    }

    /// Next pose
    pub fn skip_forward(&self) -> bool {
        self.send(PlaybackCommand::SkipForward)
    }

    /// Previous pose
    pub fn skip_backward(&self) -> bool {
        self.send(PlaybackCommand::SkipBackward)
    }

    /// Leave the practice
    pub fn exit(&self) -> bool {
        self.send(PlaybackCommand::Exit)
    }

    /// Flip the mute flag
    pub fn toggle_mute(&self) -> bool {
        self.send(PlaybackCommand::ToggleMute)
    }

    /// Change a setting
    pub fn update_setting(&self, update: SettingUpdate) -> bool {
        self.send(PlaybackCommand::UpdateSetting { update })
    }

    /// Whether the practice is still accepting commands
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Single-owner driver for one practice
pub struct PracticeRunner<S> {
    engine: PlaybackEngine,
    source: S,
}

impl<S: SequenceSource + 'static> PracticeRunner<S> {
    /// Pair an engine with the source it loads from
    pub fn new(engine: PlaybackEngine, source: S) -> Self {
        Self { engine, source }
    }

    /// Spawn the runner on the current runtime
    pub fn spawn(self) -> (PracticeHandle, JoinHandle<PracticeOutcome>) {
        let (handle, commands) = command_channel();
        let task = tokio::spawn(self.run(commands));
        (handle, task)
    }

    /// Run the practice to a terminal state
    pub async fn run(self, commands: mpsc::UnboundedReceiver<PlaybackCommand>) -> PracticeOutcome {
        let span = tracing::info_span!(
            "practice",
            run_id = %Uuid::new_v4(),
            sequence_id = %self.engine.sequence_id(),
        );
        self.run_inner(commands).instrument(span).await
    }

    async fn run_inner(
        self,
        mut commands: mpsc::UnboundedReceiver<PlaybackCommand>,
    ) -> PracticeOutcome {
        let Self { mut engine, source } = self;

        // Loading: commands stay live so an exit can cancel the fetch
        {
            let sequence_id = engine.sequence_id().clone();
            tracing::debug!(source = source.name(), "Loading sequence");
            let fetch = source.fetch(&sequence_id);
            tokio::pin!(fetch);
            loop {
                tokio::select! {
                    biased;

                    command = commands.recv() => {
                        apply_command(&mut engine, command);
                        if engine.state().is_terminal() {
                            break;
                        }
                    }

                    result = &mut fetch => {
                        engine.loaded(result);
                        break;
                    }
                }
            }
        }

        let mut clock: Option<Clock> = None;
        while !engine.state().is_terminal() {
            reconcile_clock(&engine, &mut clock);

            tokio::select! {
                biased;

                command = commands.recv() => apply_command(&mut engine, command),

                _ = next_tick(&mut clock) => engine.tick(),
            }
        }
        drop(clock);

        if engine.state().status() == PlaybackStatus::Completed
            && tokio::time::timeout(SAVE_GRACE, engine.flush()).await.is_err()
        {
            tracing::warn!("Session save still pending after {:?}", SAVE_GRACE);
        }

        outcome(&engine)
    }
}

impl<S> std::fmt::Debug for PracticeRunner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeRunner")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

/// Apply a received command; a closed channel is an implicit exit
fn apply_command(engine: &mut PlaybackEngine, command: Option<PlaybackCommand>) {
    match command {
        Some(command) => engine.handle(command),
        None => {
            tracing::debug!("Command channel closed; leaving practice");
            engine.exit();
        }
    }
}

fn reconcile_clock(engine: &PlaybackEngine, clock: &mut Option<Clock>) {
    match (engine.state().wants_clock(), clock.is_some()) {
        (true, false) => *clock = Some(Clock::start()),
        (false, true) => *clock = None,
        _ => {}
    }
}

async fn next_tick(clock: &mut Option<Clock>) {
    match clock {
        Some(clock) => {
            clock.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn outcome(engine: &PlaybackEngine) -> PracticeOutcome {
    match (engine.state().phase(), engine.summary()) {
        (Phase::Completed, Some(summary)) => PracticeOutcome::Completed(summary.clone()),
        (Phase::Failed(kind), _) => PracticeOutcome::Failed(*kind),
        _ => PracticeOutcome::Exited,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::cue::SilentCues;
    use crate::engine::EngineOptions;
    use crate::messages::PlaybackMessage;
    use crate::recorder::MemoryRecorder;
    use crate::sequence::{Pose, Sequence, SequenceId};
    use crate::settings::Settings;
    use crate::source::{CatalogSequenceSource, FetchError};

    /// Source whose fetch never resolves
    struct StalledSource;

    #[async_trait]
    impl SequenceSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch(&self, _id: &SequenceId) -> Result<Sequence, FetchError> {
            std::future::pending().await
        }
    }

    fn catalog(durations: &[u32]) -> CatalogSequenceSource {
        let poses = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Pose::new(format!("Pose {i}"), *d))
            .collect();
        let sequence = Sequence::new("flow".into(), "Flow", poses).expect("valid sequence");
        CatalogSequenceSource::new().with_sequence(sequence)
    }

    fn engine(
        recorder: &MemoryRecorder,
    ) -> (PlaybackEngine, mpsc::UnboundedReceiver<PlaybackMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = PlaybackEngine::new(
            "flow".into(),
            Settings::default(),
            EngineOptions::default(),
            Box::new(SilentCues),
            Arc::new(recorder.clone()),
            tx,
        );
        (engine, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion_in_scheduled_time() {
        let recorder = MemoryRecorder::new();
        let (engine, _rx) = engine(&recorder);
        let start = Instant::now();

        let (_handle, task) = PracticeRunner::new(engine, catalog(&[60, 90, 120])).spawn();
        let outcome = task.await.expect("runner task");

        assert_eq!(start.elapsed(), Duration::from_secs(270));
        let PracticeOutcome::Completed(summary) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(summary.duration_minutes, 5);
        assert_eq!(summary.poses_completed, 3);
        assert_eq!(recorder.saved(), vec![summary]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_while_loading_cancels_fetch() {
        let recorder = MemoryRecorder::new();
        let (engine, _rx) = engine(&recorder);

        let (handle, task) = PracticeRunner::new(engine, StalledSource).spawn();
        assert!(handle.exit());

        assert_eq!(task.await.expect("runner task"), PracticeOutcome::Exited);
        assert_eq!(recorder.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_exits() {
        let recorder = MemoryRecorder::new();
        let (engine, mut rx) = engine(&recorder);

        let (handle, task) = PracticeRunner::new(engine, catalog(&[30])).spawn();
        drop(handle);

        assert_eq!(task.await.expect("runner task"), PracticeOutcome::Exited);
        assert_eq!(recorder.attempts(), 0);

        let mut exited = false;
        while let Ok(msg) = rx.try_recv() {
            exited |= matches!(msg, PlaybackMessage::Exited);
        }
        assert!(exited);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_sequence_fails() {
        let recorder = MemoryRecorder::new();
        let (engine, _rx) = engine(&recorder);

        let (_handle, task) = PracticeRunner::new(engine, CatalogSequenceSource::new()).spawn();

        assert_eq!(
            task.await.expect("runner task"),
            PracticeOutcome::Failed(FailureKind::NotFound)
        );
        assert_eq!(recorder.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_reports_inactive_after_completion() {
        let recorder = MemoryRecorder::new();
        let (engine, _rx) = engine(&recorder);

        let (handle, task) = PracticeRunner::new(engine, catalog(&[2])).spawn();
        task.await.expect("runner task");

        assert!(!handle.is_active());
        assert!(!handle.pause());
    }
}
