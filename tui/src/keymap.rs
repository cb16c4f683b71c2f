//! Key Bindings
//!
//! Maps terminal key presses to [`PlaybackCommand`]s. Setting keys step the
//! current value; the engine clamps whatever they produce.
//!
//! | Key                | Action                         |
//! |--------------------|--------------------------------|
//! | Space              | Pause / resume                 |
//! | `→` / `n`          | Next pose                      |
//! | `←` / `p`          | Previous pose                  |
//! | `m`                | Mute / unmute cues             |
//! | `+` / `-`          | Warning window up / down       |
//! | `]` / `[`          | Volume up / down               |
//! | Esc / `q` / Ctrl-C | Leave the practice             |

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use practice_core::{PlaybackCommand, SettingUpdate, Settings};

/// Volume change per key press
const VOLUME_STEP: f32 = 0.1;

/// What a key press asks the app to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyAction {
    /// Forward a command to the engine
    Command(PlaybackCommand),
    /// Close the finished-practice screen
    Dismiss,
}

/// Help line shown in the footer
pub const HELP: &str =
    "space pause | ←/→ skip | m mute | +/- warning | [/] volume | esc quit";

/// Translate a key press during a practice
///
/// Once the practice is over, any key dismisses the closing screen.
pub fn map_key(key: KeyEvent, settings: &Settings, practice_over: bool) -> Option<KeyAction> {
    if practice_over {
        return Some(KeyAction::Dismiss);
    }

    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            PlaybackCommand::Exit
        }
        KeyCode::Esc | KeyCode::Char('q') => PlaybackCommand::Exit,
        KeyCode::Char(' ') => PlaybackCommand::TogglePause,
        KeyCode::Right | KeyCode::Char('n') => PlaybackCommand::SkipForward,
        KeyCode::Left | KeyCode::Char('p') => PlaybackCommand::SkipBackward,
        KeyCode::Char('m') => PlaybackCommand::ToggleMute,
        KeyCode::Char('+' | '=') => update(SettingUpdate::TransitionWarning(
            settings.transition_warning_seconds.saturating_add(1),
        )),
        KeyCode::Char('-') => update(SettingUpdate::TransitionWarning(
            settings.transition_warning_seconds.saturating_sub(1),
        )),
        KeyCode::Char(']') => update(SettingUpdate::Volume(settings.volume + VOLUME_STEP)),
        KeyCode::Char('[') => update(SettingUpdate::Volume(settings.volume - VOLUME_STEP)),
        _ => return None,
    };
    Some(KeyAction::Command(command))
}

fn update(update: SettingUpdate) -> PlaybackCommand {
    PlaybackCommand::UpdateSetting { update }
}
