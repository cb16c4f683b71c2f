//! Playback Messages
//!
//! Messages sent from the engine to surfaces. A surface is a pure renderer:
//! it keeps the latest [`PlaybackSnapshot`] and reacts to the discrete
//! signals (pose changes, warnings, completion) for transient effects.
//!
//! After every state change the engine sends the signal messages first and a
//! [`PlaybackMessage::StateChanged`] last, so the snapshot a surface holds is
//! never older than the signals it has seen.

use serde::{Deserialize, Serialize};

use crate::engine::PlaybackStatus;
use crate::recorder::SessionSummary;
use crate::sequence::Pose;
use crate::settings::{SettingKey, Settings};
use crate::source::FailureKind;

/// Why the current pose changed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeReason {
    /// First pose of the practice
    Start,
    /// Previous pose expired
    Natural,
    /// Player skipped forward
    SkipForward,
    /// Player skipped backward
    SkipBackward,
}

/// Messages from the engine to a surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum PlaybackMessage {
    // ============================================
    // Lifecycle
    // ============================================
    /// Sequence fetched and validated
    Loaded {
        /// Sequence display name
        name: String,
        /// Number of poses
        pose_count: usize,
        /// Sum of pose durations
        total_seconds: u64,
    },

    /// Lead-in countdown started
    LeadIn {
        /// Seconds until the first pose
        seconds: u32,
    },

    /// Fetch failed; the practice cannot start
    Failed {
        /// Failure classification
        kind: FailureKind,
        /// Error description
        message: String,
    },

    /// Final pose expired; the summary is being recorded
    Completed {
        /// The summary handed to the recorder
        summary: SessionSummary,
    },

    /// Player left the practice
    Exited,

    // ============================================
    // Traversal
    // ============================================
    /// A new pose is under the cursor
    PoseChanged {
        /// Index of the new pose
        index: usize,
        /// The new pose
        pose: Pose,
        /// Why it changed
        reason: ChangeReason,
    },

    /// The current pose is about to end
    Warning {
        /// Index of the upcoming pose
        next_index: usize,
        /// The upcoming pose, for an "up next" preview
        next: Pose,
    },

    /// Countdown frozen
    Paused,

    /// Countdown continuing
    Resumed,

    // ============================================
    // Preferences
    // ============================================
    /// Mute flag flipped
    MuteChanged {
        /// New mute flag
        muted: bool,
    },

    /// A setting changed
    SettingChanged {
        /// Which setting
        key: SettingKey,
        /// Settings after the change
        settings: Settings,
        /// Whether the requested value was clamped into range
        clamped: bool,
    },

    // ============================================
    // State
    // ============================================
    /// Full state after a change
    StateChanged {
        /// Current state
        snapshot: PlaybackSnapshot,
    },
}

/// Read-only view of the playback state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Coarse status
    pub status: PlaybackStatus,
    /// Name of the loaded sequence
    pub sequence_name: Option<String>,
    /// Current pose index (running or paused only)
    pub index: Option<usize>,
    /// Number of poses in the sequence (0 before loading)
    pub pose_count: usize,
    /// Seconds left in the current countdown
    pub remaining_seconds: u32,
    /// Whether the current pose's warning has fired
    pub warning_shown: bool,
    /// Pose under the cursor
    pub current: Option<Pose>,
    /// Upcoming pose
    pub next: Option<Pose>,
    /// Whether cues are muted
    pub muted: bool,
    /// Live settings
    pub settings: Settings,
    /// Scheduled seconds already practised
    pub elapsed_seconds: u64,
    /// Sum of all pose durations
    pub total_seconds: u64,
    /// Failure classification, when failed
    pub failure: Option<FailureKind>,
}

impl PlaybackSnapshot {
    /// Fraction of the sequence practised, in `[0, 1]`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 0.0;
        }
        (self.elapsed_seconds as f64 / self.total_seconds as f64).clamp(0.0, 1.0)
    }

    /// 1-based "pose N of M" label, when a pose is active
    #[must_use]
    pub fn position_label(&self) -> Option<String> {
        self.index
            .map(|i| format!("Pose {} of {}", i + 1, self.pose_count))
    }
}

/// Format seconds as `m:ss`
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
