//! Playback Commands
//!
//! Everything a surface can ask the engine to do. Surfaces translate their
//! own input (key presses, buttons, scripts) into these commands; they never
//! decide what a command means for the countdown.
//!
//! Every command is safe in every state. Where the state machine has no
//! matching transition the command is a no-op, not an error.

use serde::{Deserialize, Serialize};

use crate::settings::SettingUpdate;

/// Commands from a surface to the engine
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlaybackCommand {
    /// Freeze the countdown
    Pause,
    /// Continue a frozen countdown
    Resume,
    /// Pause when running, resume when paused
    TogglePause,
    /// Jump to the start of the next pose
    SkipForward,
    /// Jump to the start of the previous pose
    SkipBackward,
    /// Leave the practice without recording it
    Exit,
    /// Flip the cue mute flag
    ToggleMute,
    /// Change a single setting
    UpdateSetting {
        /// The change to apply
        update: SettingUpdate,
    },
}

impl PlaybackCommand {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::TogglePause => "toggle_pause",
            Self::SkipForward => "skip_forward",
            Self::SkipBackward => "skip_backward",
            Self::Exit => "exit",
            Self::ToggleMute => "toggle_mute",
            Self::UpdateSetting { .. } => "update_setting",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let json = serde_json::to_string(&PlaybackCommand::SkipForward).unwrap();
        assert_eq!(json, r#"{"command":"skip_forward"}"#);

        let cmd: PlaybackCommand = serde_json::from_str(
            r#"{"command":"update_setting","update":{"key":"volume","value":0.5}}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            PlaybackCommand::UpdateSetting {
                update: SettingUpdate::Volume(0.5)
            }
        );
    }

    #[test]
    fn test_command_names() {
        assert_eq!(PlaybackCommand::TogglePause.name(), "toggle_pause");
        assert_eq!(PlaybackCommand::Exit.name(), "exit");
    }
}
