//! Theme and Colors
//!
//! A calm palette for the practice screen: sage for the active pose, warm
//! sand for the up-next warning, dim stone for chrome.

use ratatui::style::{Color, Modifier, Style};

use practice_core::PlaybackStatus;

// ============================================================================
// Palette
// ============================================================================

/// Active pose name and countdown
pub const SAGE: Color = Color::Rgb(143, 188, 143);

/// Sanskrit names and secondary text
pub const MIST: Color = Color::Rgb(176, 196, 222);

/// Up-next preview and warnings
pub const SAND: Color = Color::Rgb(238, 203, 140);

/// Paused indicator
pub const DUSK: Color = Color::Rgb(186, 140, 200);

/// Borders, help line, dim text
pub const STONE: Color = Color::Rgb(110, 110, 110);

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

// ============================================================================
// Styles
// ============================================================================

/// Style for the status badge
pub fn status_style(status: PlaybackStatus) -> Style {
    let color = match status {
        PlaybackStatus::Loading | PlaybackStatus::Ready => MIST,
        PlaybackStatus::Running => SAGE,
        PlaybackStatus::Paused => DUSK,
        PlaybackStatus::Completed => SUCCESS_GREEN,
        PlaybackStatus::Failed => ERROR_RED,
        PlaybackStatus::Exited => STONE,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for the big countdown
pub fn countdown_style(warning: bool) -> Style {
    let color = if warning { SAND } else { SAGE };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for chrome text
pub fn dim() -> Style {
    Style::default().fg(STONE)
}
