//! Practice Settings
//!
//! A small value object the player can tweak mid-session. Values are always
//! kept inside their documented ranges: out-of-range updates are clamped
//! rather than rejected, so a settings change can never fail a session.
//!
//! Settings are not retroactive. The engine reads them when it needs them,
//! which for the transition warning means every tick.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed range for the lead-in countdown, in seconds
pub const PREPARATION_RANGE: (u32, u32) = (5, 30);

/// Allowed range for the transition warning window, in seconds
pub const TRANSITION_WARNING_RANGE: (u32, u32) = (3, 10);

/// Errors from parsing a setting key or value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Unknown setting name
    #[error("unknown setting '{0}'")]
    UnknownKey(String),

    /// Value could not be parsed for the given key
    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidValue {
        /// Setting being updated
        key: SettingKey,
        /// Raw value that failed to parse
        value: String,
    },
}

/// Player-adjustable practice settings
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Lead-in before the first pose, in `[5, 30]` seconds
    pub preparation_time_seconds: u32,
    /// How long before a transition the warning fires, in `[3, 10]` seconds
    pub transition_warning_seconds: u32,
    /// Cue volume in `[0, 1]`
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preparation_time_seconds: 10,
            transition_warning_seconds: 5,
            volume: 0.8,
        }
    }
}

impl Settings {
    /// Build settings, clamping each value into range
    #[must_use]
    pub fn new(preparation_time_seconds: u32, transition_warning_seconds: u32, volume: f32) -> Self {
        Self {
            preparation_time_seconds: clamp_preparation(preparation_time_seconds),
            transition_warning_seconds: clamp_warning(transition_warning_seconds),
            volume: clamp_volume(volume),
        }
    }

    /// Apply a single update in place
    ///
    /// Returns `true` if the requested value had to be clamped.
    pub fn apply(&mut self, update: SettingUpdate) -> bool {
        match update {
            SettingUpdate::PreparationTime(secs) => {
                self.preparation_time_seconds = clamp_preparation(secs);
                self.preparation_time_seconds != secs
            }
            SettingUpdate::TransitionWarning(secs) => {
                self.transition_warning_seconds = clamp_warning(secs);
                self.transition_warning_seconds != secs
            }
            SettingUpdate::Volume(volume) => {
                self.volume = clamp_volume(volume);
                volume.is_nan() || (self.volume - volume).abs() > f32::EPSILON
            }
        }
    }
}

fn clamp_preparation(secs: u32) -> u32 {
    secs.clamp(PREPARATION_RANGE.0, PREPARATION_RANGE.1)
}

fn clamp_warning(secs: u32) -> u32 {
    secs.clamp(TRANSITION_WARNING_RANGE.0, TRANSITION_WARNING_RANGE.1)
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// Name of a single setting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    /// `preparationTime`
    PreparationTime,
    /// `transitionWarning`
    TransitionWarning,
    /// `volume`
    Volume,
}

impl SettingKey {
    /// Wire name of the key
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreparationTime => "preparationTime",
            Self::TransitionWarning => "transitionWarning",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preparationTime" | "preparation_time" | "preparationTimeSeconds" => {
                Ok(Self::PreparationTime)
            }
            "transitionWarning" | "transition_warning" | "transitionWarningSeconds" => {
                Ok(Self::TransitionWarning)
            }
            "volume" => Ok(Self::Volume),
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }
}

/// A typed `(key, value)` settings change
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum SettingUpdate {
    /// New lead-in time in seconds
    PreparationTime(u32),
    /// New warning window in seconds
    TransitionWarning(u32),
    /// New cue volume
    Volume(f32),
}

impl SettingUpdate {
    /// Parse an update from a key and a raw string value
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] if the value is not numeric.
    pub fn parse(key: SettingKey, value: &str) -> Result<Self, SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            key,
            value: value.to_string(),
        };
        let value = value.trim();
        match key {
            SettingKey::PreparationTime => value
                .parse()
                .map(Self::PreparationTime)
                .map_err(|_| invalid()),
            SettingKey::TransitionWarning => value
                .parse()
                .map(Self::TransitionWarning)
                .map_err(|_| invalid()),
            SettingKey::Volume => value.parse().map(Self::Volume).map_err(|_| invalid()),
        }
    }

    /// Key this update targets
    #[must_use]
    pub fn key(&self) -> SettingKey {
        match self {
            Self::PreparationTime(_) => SettingKey::PreparationTime,
            Self::TransitionWarning(_) => SettingKey::TransitionWarning,
            Self::Volume(_) => SettingKey::Volume,
        }
    }
}
