//! End-to-end practice tests
//!
//! These drive a real [`PracticeRunner`] and its one-second clock on a
//! paused tokio runtime, so wall-clock behaviour is exact and instant.
//! Commands are issued at half-second offsets to stay clear of tick
//! boundaries.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use practice_core::{
    CatalogSequenceSource, ChangeReason, Cue, CueDispatcher, CueError, EngineOptions,
    MemoryRecorder, PlaybackEngine, PlaybackMessage, PlaybackSnapshot, PlaybackStatus, Pose,
    PracticeHandle, PracticeOutcome, PracticeRunner, Sequence, SettingUpdate, Settings,
};

// ============================================================================
// Harness
// ============================================================================

#[derive(Clone, Default)]
struct CueLog(Arc<Mutex<Vec<Cue>>>);

impl CueDispatcher for CueLog {
    fn name(&self) -> &str {
        "log"
    }

    fn play(&mut self, cue: Cue, _volume: f32) -> Result<(), CueError> {
        self.0.lock().push(cue);
        Ok(())
    }
}

struct Practice {
    handle: PracticeHandle,
    task: JoinHandle<PracticeOutcome>,
    rx: mpsc::UnboundedReceiver<PlaybackMessage>,
    recorder: MemoryRecorder,
    cues: CueLog,
    started: Instant,
}

impl Practice {
    fn start(durations: &[u32], options: EngineOptions) -> Self {
        Self::start_with(durations, options, Settings::default())
    }

    fn start_with(durations: &[u32], options: EngineOptions, settings: Settings) -> Self {
        let poses = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Pose::new(format!("Pose {}", i + 1), *d))
            .collect();
        let sequence = Sequence::new("flow".into(), "Flow", poses).unwrap();
        let source = CatalogSequenceSource::new().with_sequence(sequence);

        let (tx, rx) = mpsc::unbounded_channel();
        let recorder = MemoryRecorder::new();
        let cues = CueLog::default();
        let engine = PlaybackEngine::new(
            "flow".into(),
            settings,
            options,
            Box::new(cues.clone()),
            Arc::new(recorder.clone()),
            tx,
        );
        let started = Instant::now();
        let (handle, task) = PracticeRunner::new(engine, source).spawn();

        Self {
            handle,
            task,
            rx,
            recorder,
            cues,
            started,
        }
    }

    /// Sleep until `secs` after the practice started
    async fn at(&self, secs: f64) {
        tokio::time::sleep_until(self.started + Duration::from_secs_f64(secs)).await;
    }

    /// Wait for the next snapshot with the given status
    async fn snapshot_with(&mut self, status: PlaybackStatus) -> PlaybackSnapshot {
        loop {
            match self.rx.recv().await {
                Some(PlaybackMessage::StateChanged { snapshot }) if snapshot.status == status => {
                    return snapshot
                }
                Some(_) => {}
                None => panic!("engine closed before reaching {status:?}"),
            }
        }
    }

    /// Wait for the first pose to start
    async fn started(&mut self) {
        self.snapshot_with(PlaybackStatus::Running).await;
    }

    /// Wait for the runner and collect every remaining message
    async fn finish(mut self) -> (PracticeOutcome, Vec<PlaybackMessage>, Self) {
        let outcome = (&mut self.task).await.unwrap();
        let mut messages = Vec::new();
        while let Some(msg) = self.rx.recv().await {
            messages.push(msg);
        }
        (outcome, messages, self)
    }
}

fn pose_changes(messages: &[PlaybackMessage]) -> Vec<(usize, ChangeReason)> {
    messages
        .iter()
        .filter_map(|m| match m {
            PlaybackMessage::PoseChanged { index, reason, .. } => Some((*index, *reason)),
            _ => None,
        })
        .collect()
}

fn warnings(messages: &[PlaybackMessage]) -> Vec<usize> {
    messages
        .iter()
        .filter_map(|m| match m {
            PlaybackMessage::Warning { next_index, .. } => Some(*next_index),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Natural completion
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_three_poses_complete_after_their_total_duration() {
    let practice = Practice::start(&[60, 90, 120], EngineOptions::default());
    let (outcome, messages, practice) = practice.finish().await;

    assert_eq!(practice.started.elapsed(), Duration::from_secs(270));

    let PracticeOutcome::Completed(summary) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(summary.sequence_id.as_str(), "flow");
    assert_eq!(summary.duration_minutes, 5);
    assert_eq!(summary.poses_completed, 3);
    assert_eq!(practice.recorder.saved(), vec![summary]);

    assert_eq!(
        pose_changes(&messages),
        vec![
            (0, ChangeReason::Start),
            (1, ChangeReason::Natural),
            (2, ChangeReason::Natural),
        ]
    );
    assert_eq!(warnings(&messages), vec![1, 2]);
    assert_eq!(
        messages
            .iter()
            .filter(|m| matches!(m, PlaybackMessage::Completed { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_warning_cue_always_precedes_its_transition_cue() {
    let practice = Practice::start(&[10, 10, 10], EngineOptions::default());
    let (_, _, practice) = practice.finish().await;

    assert_eq!(
        *practice.cues.0.lock(),
        vec![
            Cue::Warning,
            Cue::Transition,
            Cue::Warning,
            Cue::Transition,
            Cue::Transition,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_remaining_never_increases_within_a_pose() {
    let practice = Practice::start(&[12, 7], EngineOptions::default());
    let (_, messages, _) = practice.finish().await;

    let mut last: Option<(usize, u32)> = None;
    for msg in &messages {
        let PlaybackMessage::StateChanged { snapshot } = msg else {
            continue;
        };
        let Some(index) = snapshot.index else {
            continue;
        };
        if let Some((prev_index, prev_remaining)) = last {
            if prev_index == index {
                assert!(snapshot.remaining_seconds <= prev_remaining);
            }
        }
        last = Some((index, snapshot.remaining_seconds));
    }
}

#[tokio::test(start_paused = true)]
async fn test_lead_in_counts_down_before_first_pose() {
    let settings = Settings::new(5, 5, 0.8);
    let options = EngineOptions {
        lead_in: true,
        ..EngineOptions::default()
    };
    let practice = Practice::start_with(&[20], options, settings);
    let (outcome, messages, practice) = practice.finish().await;

    assert!(matches!(outcome, PracticeOutcome::Completed(_)));
    assert_eq!(practice.started.elapsed(), Duration::from_secs(25));
    assert!(messages
        .iter()
        .any(|m| matches!(m, PlaybackMessage::LeadIn { seconds: 5 })));
}

// ============================================================================
// Pause / resume
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_the_countdown() {
    let mut practice = Practice::start(&[60, 90, 120], EngineOptions::default());
    practice.started().await;

    practice.at(30.5).await;
    practice.handle.pause();
    let paused = practice.snapshot_with(PlaybackStatus::Paused).await;
    assert_eq!(paused.index, Some(0));
    assert_eq!(paused.remaining_seconds, 30);

    practice.at(40.5).await;
    practice.handle.resume();
    let resumed = practice.snapshot_with(PlaybackStatus::Running).await;
    assert_eq!(resumed.index, Some(0));
    assert_eq!(resumed.remaining_seconds, 30);

    let (outcome, _, practice) = practice.finish().await;
    assert!(matches!(outcome, PracticeOutcome::Completed(_)));
    assert_eq!(practice.started.elapsed(), Duration::from_secs(280));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_pause_twice_is_a_round_trip() {
    let mut practice = Practice::start(&[30], EngineOptions::default());
    practice.started().await;

    practice.at(3.5).await;
    practice.handle.toggle_pause();
    let paused = practice.snapshot_with(PlaybackStatus::Paused).await;
    practice.handle.toggle_pause();
    let resumed = practice.snapshot_with(PlaybackStatus::Running).await;

    assert_eq!(paused.remaining_seconds, 27);
    assert_eq!(resumed.remaining_seconds, 27);
    practice.handle.exit();
}

// ============================================================================
// Exit
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_exit_never_records_even_as_time_passes() {
    let mut practice = Practice::start(&[10, 10], EngineOptions::default());
    practice.started().await;

    practice.at(5.5).await;
    practice.handle.exit();
    practice.snapshot_with(PlaybackStatus::Exited).await;

    practice.at(120.0).await;
    let (outcome, messages, practice) = practice.finish().await;

    assert_eq!(outcome, PracticeOutcome::Exited);
    assert_eq!(practice.recorder.attempts(), 0);
    assert!(!messages
        .iter()
        .any(|m| matches!(m, PlaybackMessage::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_exit_from_pause_never_records() {
    let mut practice = Practice::start(&[10], EngineOptions::default());
    practice.started().await;

    practice.handle.pause();
    practice.snapshot_with(PlaybackStatus::Paused).await;
    practice.handle.exit();

    let (outcome, _, practice) = practice.finish().await;
    assert_eq!(outcome, PracticeOutcome::Exited);
    assert_eq!(practice.recorder.attempts(), 0);
}

// ============================================================================
// Skipping
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_skips_stop_at_the_ends_of_the_sequence() {
    let mut practice = Practice::start(&[30, 30, 30], EngineOptions::default());
    practice.started().await;

    practice.handle.skip_backward();
    for _ in 0..3 {
        practice.handle.skip_forward();
    }
    practice.handle.exit();

    let (outcome, messages, practice) = practice.finish().await;
    assert_eq!(outcome, PracticeOutcome::Exited);
    assert_eq!(
        pose_changes(&messages),
        vec![(1, ChangeReason::SkipForward), (2, ChangeReason::SkipForward)]
    );
    assert_eq!(practice.recorder.attempts(), 0);
    // skipping never plays a cue
    assert!(practice.cues.0.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_skip_back_restarts_the_previous_pose_in_full() {
    let mut practice = Practice::start(&[20, 40], EngineOptions::default());
    practice.started().await;

    // first transition at 20s; skip back 5s into the second pose
    practice.at(25.5).await;
    practice.handle.skip_backward();
    loop {
        match practice.rx.recv().await {
            Some(PlaybackMessage::PoseChanged {
                index,
                reason: ChangeReason::SkipBackward,
                ..
            }) => {
                assert_eq!(index, 0);
                break;
            }
            Some(_) => {}
            None => panic!("no skip"),
        }
    }
    let snapshot = practice.snapshot_with(PlaybackStatus::Running).await;
    assert_eq!(snapshot.index, Some(0));
    assert_eq!(snapshot.remaining_seconds, 20);
    assert!(!snapshot.warning_shown);
    practice.handle.exit();
}

// ============================================================================
// Live settings
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_warning_threshold_change_applies_to_the_current_pose() {
    let mut practice = Practice::start(&[30, 30], EngineOptions::default());
    practice.started().await;

    practice
        .handle
        .update_setting(SettingUpdate::TransitionWarning(10));

    loop {
        match practice.rx.recv().await {
            Some(PlaybackMessage::Warning { next_index, next }) => {
                assert_eq!(next_index, 1);
                assert_eq!(next.name, "Pose 2");
                break;
            }
            Some(_) => {}
            None => panic!("no warning"),
        }
    }
    assert_eq!(practice.started.elapsed(), Duration::from_secs(20));
    practice.handle.exit();
}

#[tokio::test(start_paused = true)]
async fn test_muting_silences_cues_but_not_the_practice() {
    let mut practice = Practice::start(&[8, 8], EngineOptions::default());
    practice.started().await;
    practice.handle.toggle_mute();

    let (outcome, messages, practice) = practice.finish().await;
    assert!(matches!(outcome, PracticeOutcome::Completed(_)));
    assert!(practice.cues.0.lock().is_empty());
    assert_eq!(warnings(&messages), vec![1]);
    assert!(messages
        .iter()
        .any(|m| matches!(m, PlaybackMessage::MuteChanged { muted: true })));
}
