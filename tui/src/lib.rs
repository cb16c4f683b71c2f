//! yogaflow TUI - Terminal surface for guided practice
//!
//! A thin client over `practice-core`: key presses become
//! `PlaybackCommand`s, `PlaybackMessage`s become screen state.
//!
//! # Architecture
//!
//! - **App**: event loop joining the terminal, the engine and a frame timer
//! - **Display**: state derived from engine messages
//! - **Keymap**: key press to command translation
//! - **Cues**: terminal bell dispatcher
//! - **Widgets**: pose card rendering

pub mod app;
pub mod cues;
pub mod display;
pub mod keymap;
pub mod theme;
pub mod widgets;

pub use app::App;
