//! Playback State
//!
//! The complete state of one practice, as a tagged variant. Data that only
//! makes sense in some phases lives inside those phases: there is no
//! "current index" while loading and no countdown after completion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::messages::PlaybackSnapshot;
use crate::sequence::{Pose, Sequence};
use crate::settings::Settings;
use crate::source::FailureKind;

/// Coarse playback status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Fetching the sequence
    Loading,
    /// Sequence loaded, lead-in countdown before the first pose
    Ready,
    /// Counting down the current pose
    Running,
    /// Countdown frozen
    Paused,
    /// Final pose expired naturally (terminal)
    Completed,
    /// Sequence could not be fetched (terminal)
    Failed,
    /// Player left the practice (terminal)
    Exited,
}

impl PlaybackStatus {
    /// Whether no further transitions can happen
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Exited)
    }

    /// Human-readable name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Ready => "Get ready",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Exited => "Exited",
        }
    }
}

/// Position within a loaded sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Index of the current pose
    pub index: usize,
    /// Seconds left in the current pose
    pub remaining: u32,
    /// Whether this pose's warning already fired
    pub warning_shown: bool,
}

impl Cursor {
    /// Cursor at the start of pose `index`, with the full duration remaining
    #[must_use]
    pub fn start(pose: &Pose, index: usize) -> Self {
        Self {
            index,
            remaining: pose.duration_seconds,
            warning_shown: false,
        }
    }
}

/// Lifecycle phase with its phase-specific data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the sequence
    Loading,
    /// Lead-in countdown
    Ready {
        /// Seconds until the first pose
        remaining: u32,
    },
    /// Counting down
    Running(Cursor),
    /// Frozen
    Paused(Cursor),
    /// Finished naturally
    Completed,
    /// Fetch failed
    Failed(FailureKind),
    /// Left by the player
    Exited,
}

impl Phase {
    /// Coarse status of this phase
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        match self {
            Self::Loading => PlaybackStatus::Loading,
            Self::Ready { .. } => PlaybackStatus::Ready,
            Self::Running(_) => PlaybackStatus::Running,
            Self::Paused(_) => PlaybackStatus::Paused,
            Self::Completed => PlaybackStatus::Completed,
            Self::Failed(_) => PlaybackStatus::Failed,
            Self::Exited => PlaybackStatus::Exited,
        }
    }

    /// Cursor, if the phase has one
    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            Self::Running(c) | Self::Paused(c) => Some(c),
            _ => None,
        }
    }
}

/// Everything the engine knows about one practice
#[derive(Clone, Debug)]
pub struct PlaybackState {
    pub(crate) phase: Phase,
    pub(crate) muted: bool,
    pub(crate) settings: Settings,
    pub(crate) sequence: Option<Arc<Sequence>>,
    pub(crate) lead_in: bool,
}

impl PlaybackState {
    /// Fresh state in `Loading`
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            phase: Phase::Loading,
            muted: false,
            settings,
            sequence: None,
            lead_in: false,
        }
    }

    /// Count down `preparation_time_seconds` before the first pose
    #[must_use]
    pub fn with_lead_in(mut self, lead_in: bool) -> Self {
        self.lead_in = lead_in;
        self
    }

    /// Start muted
    #[must_use]
    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Coarse status
    #[must_use]
    pub fn status(&self) -> PlaybackStatus {
        self.phase.status()
    }

    /// Current pose index (only while running or paused)
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.phase.cursor().map(|c| c.index)
    }

    /// Seconds left in the current countdown (pose or lead-in)
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        match &self.phase {
            Phase::Ready { remaining } => *remaining,
            Phase::Running(c) | Phase::Paused(c) => c.remaining,
            _ => 0,
        }
    }

    /// Whether the current pose's warning has fired
    #[must_use]
    pub fn warning_shown(&self) -> bool {
        self.phase.cursor().is_some_and(|c| c.warning_shown)
    }

    /// Whether cues are muted
    #[must_use]
    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Live settings
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Loaded sequence, if any
    #[must_use]
    pub fn sequence(&self) -> Option<&Arc<Sequence>> {
        self.sequence.as_ref()
    }

    /// Whether the lead-in countdown is enabled
    #[must_use]
    pub fn lead_in(&self) -> bool {
        self.lead_in
    }

    /// Whether the practice is over
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Whether a clock should be running for this state
    ///
    /// The clock keeps running while paused; those ticks are discarded.
    #[must_use]
    pub fn wants_clock(&self) -> bool {
        matches!(
            self.phase,
            Phase::Ready { .. } | Phase::Running(_) | Phase::Paused(_)
        )
    }

    /// Pose under the cursor
    #[must_use]
    pub fn current_pose(&self) -> Option<&Pose> {
        let index = self.current_index()?;
        self.sequence.as_ref()?.pose(index)
    }

    /// Pose after the cursor (the first pose during lead-in)
    #[must_use]
    pub fn next_pose(&self) -> Option<&Pose> {
        let sequence = self.sequence.as_ref()?;
        match &self.phase {
            Phase::Ready { .. } => sequence.pose(0),
            Phase::Running(c) | Phase::Paused(c) => sequence.pose(c.index + 1),
            _ => None,
        }
    }

    /// Scheduled seconds already practised
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        let Some(sequence) = self.sequence.as_ref() else {
            return 0;
        };
        match &self.phase {
            Phase::Running(c) | Phase::Paused(c) => {
                let duration = sequence
                    .pose(c.index)
                    .map_or(0, |p| p.duration_seconds);
                sequence.seconds_before(c.index) + u64::from(duration.saturating_sub(c.remaining))
            }
            Phase::Completed => sequence.total_duration_seconds(),
            _ => 0,
        }
    }

    /// Read-only view for surfaces
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status(),
            sequence_name: self.sequence.as_ref().map(|s| s.name().to_string()),
            index: self.current_index(),
            pose_count: self.sequence.as_ref().map_or(0, |s| s.len()),
            remaining_seconds: self.remaining_seconds(),
            warning_shown: self.warning_shown(),
            current: self.current_pose().cloned(),
            next: self.next_pose().cloned(),
            muted: self.muted,
            settings: self.settings,
            elapsed_seconds: self.elapsed_seconds(),
            total_seconds: self
                .sequence
                .as_ref()
                .map_or(0, |s| s.total_duration_seconds()),
            failure: match self.phase {
                Phase::Failed(kind) => Some(kind),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(phase: Phase) -> PlaybackState {
        let poses = vec![Pose::new("A", 60), Pose::new("B", 90), Pose::new("C", 120)];
        let sequence = Sequence::new("abc".into(), "ABC", poses).unwrap();
        PlaybackState {
            phase,
            sequence: Some(Arc::new(sequence)),
            ..PlaybackState::new(Settings::default())
        }
    }

    #[test]
    fn test_loading_has_no_cursor() {
        let state = PlaybackState::new(Settings::default());
        assert_eq!(state.status(), PlaybackStatus::Loading);
        assert_eq!(state.current_index(), None);
        assert_eq!(state.remaining_seconds(), 0);
        assert!(!state.wants_clock());
    }

    #[test]
    fn test_elapsed_counts_previous_poses() {
        let state = loaded(Phase::Running(Cursor {
            index: 1,
            remaining: 30,
            warning_shown: false,
        }));
        assert_eq!(state.elapsed_seconds(), 60 + 60);
        assert_eq!(state.current_pose().unwrap().name, "B");
        assert_eq!(state.next_pose().unwrap().name, "C");
    }

    #[test]
    fn test_clock_wanted_while_paused() {
        let state = loaded(Phase::Paused(Cursor {
            index: 0,
            remaining: 10,
            warning_shown: false,
        }));
        assert!(state.wants_clock());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_snapshot_of_completed() {
        let snapshot = loaded(Phase::Completed).snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Completed);
        assert_eq!(snapshot.index, None);
        assert_eq!(snapshot.elapsed_seconds, 270);
        assert_eq!(snapshot.total_seconds, 270);
        assert!((snapshot.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snapshot_of_failed_carries_kind() {
        let state = PlaybackState {
            phase: Phase::Failed(FailureKind::NotFound),
            ..PlaybackState::new(Settings::default())
        };
        let snapshot = state.snapshot();
        assert_eq!(snapshot.failure, Some(FailureKind::NotFound));
        assert!(snapshot.status.is_terminal());
    }
}
