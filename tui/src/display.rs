//! Display State Types
//!
//! Types that represent what the practice screen currently shows. They are
//! derived from [`PlaybackMessage`]s and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client": it renders what the engine tells it. The
//! latest [`PlaybackSnapshot`] is the source of truth for the countdown;
//! the discrete messages only drive transient things such as the up-next
//! preview and short notifications.

use std::time::{Duration, Instant};

use practice_core::{
    ChangeReason, FailureKind, PlaybackMessage, PlaybackSnapshot, PlaybackStatus, Pose,
    SessionSummary, SettingKey, Settings,
};

/// How long a notification stays on screen
const NOTIFICATION_DURATION: Duration = Duration::from_secs(2);

/// A short-lived line in the status area
#[derive(Clone, Debug)]
pub struct DisplayNotification {
    /// Text to show
    pub text: String,
    /// When it was raised
    pub started: Instant,
    /// How long it should last
    pub duration: Duration,
}

impl DisplayNotification {
    /// Create a notification with the default lifetime
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            started: Instant::now(),
            duration: NOTIFICATION_DURATION,
        }
    }

    /// Whether the notification should be removed
    pub fn is_expired(&self) -> bool {
        self.started.elapsed() >= self.duration
    }
}

/// Why the practice screen is closing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayEnding {
    /// Finished naturally
    Completed(SessionSummary),
    /// Sequence could not be loaded
    Failed {
        /// Failure classification
        kind: FailureKind,
        /// Error text
        message: String,
    },
    /// The player left
    Exited,
}

/// The full display state for the TUI
#[derive(Debug, Default)]
pub struct DisplayState {
    /// Name of the loaded sequence
    pub sequence_name: Option<String>,
    /// Latest engine snapshot
    pub snapshot: Option<PlaybackSnapshot>,
    /// Preview shown once the transition warning fires
    pub up_next: Option<Pose>,
    /// Lead-in length, while counting in
    pub lead_in: Option<u32>,
    /// Pending notification (if any)
    pub notification: Option<DisplayNotification>,
    /// Set once the practice is over
    pub ending: Option<DisplayEnding>,
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an engine message
    pub fn apply_message(&mut self, msg: PlaybackMessage) {
        match msg {
            PlaybackMessage::Loaded { name, .. } => {
                self.sequence_name = Some(name);
            }
            PlaybackMessage::LeadIn { seconds } => {
                self.lead_in = Some(seconds);
            }
            PlaybackMessage::Failed { kind, message } => {
                self.ending = Some(DisplayEnding::Failed { kind, message });
            }
            PlaybackMessage::Completed { summary } => {
                self.up_next = None;
                self.ending = Some(DisplayEnding::Completed(summary));
            }
            PlaybackMessage::Exited => {
                self.ending.get_or_insert(DisplayEnding::Exited);
            }
            PlaybackMessage::PoseChanged { reason, pose, .. } => {
                self.up_next = None;
                self.lead_in = None;
                if matches!(reason, ChangeReason::SkipForward | ChangeReason::SkipBackward) {
                    self.notify(format!("Skipped to {}", pose.name));
                }
            }
            PlaybackMessage::Warning { next, .. } => {
                self.up_next = Some(next);
            }
            PlaybackMessage::Paused => self.notify("Paused"),
            PlaybackMessage::Resumed => self.notify("Resumed"),
            PlaybackMessage::MuteChanged { muted } => {
                self.notify(if muted { "Cues muted" } else { "Cues on" });
            }
            PlaybackMessage::SettingChanged { key, settings, .. } => {
                self.notify(setting_label(key, &settings));
            }
            PlaybackMessage::StateChanged { snapshot } => {
                self.snapshot = Some(snapshot);
            }
        }
    }

    /// Update timers, clearing an expired notification
    pub fn update(&mut self) {
        if self
            .notification
            .as_ref()
            .is_some_and(DisplayNotification::is_expired)
        {
            self.notification = None;
        }
    }

    /// Raise a notification, replacing any current one
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notification = Some(DisplayNotification::new(text));
    }

    /// Coarse status for rendering
    pub fn status(&self) -> PlaybackStatus {
        self.snapshot
            .as_ref()
            .map_or(PlaybackStatus::Loading, |s| s.status)
    }

    /// Current settings (defaults before the first snapshot)
    pub fn settings(&self) -> Settings {
        self.snapshot
            .as_ref()
            .map_or_else(Settings::default, |s| s.settings)
    }

    /// Whether cues are muted
    pub fn muted(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.muted)
    }

    /// Whether the practice has ended
    pub fn is_over(&self) -> bool {
        self.ending.is_some()
    }
}

/// Notification text after a setting change
fn setting_label(key: SettingKey, settings: &Settings) -> String {
    match key {
        SettingKey::PreparationTime => {
            format!("Lead-in: {}s", settings.preparation_time_seconds)
        }
        SettingKey::TransitionWarning => {
            format!("Warning: {}s before each pose", settings.transition_warning_seconds)
        }
        SettingKey::Volume => format!("Volume: {:.0}%", settings.volume * 100.0),
    }
}
