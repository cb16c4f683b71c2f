//! Practice Core - Headless Guided Yoga Playback for yogaflow
//!
//! This crate owns everything about playing a yoga sequence: fetching it,
//! counting each pose down, warning before transitions, pausing, skipping,
//! and recording the session once it completes. It has no idea how any of
//! that is shown; a surface drives it with commands and renders the
//! messages it sends back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Surfaces                             │
//! │        ┌─────────┐        ┌─────────┐       ┌──────────┐      │
//! │        │   TUI   │        │  Tests  │       │ Headless │      │
//! │        │(ratatui)│        │         │       │          │      │
//! │        └────┬────┘        └────┬────┘       └────┬─────┘      │
//! │             └──────────────────┴─────────────────┘            │
//! │                             │                                 │
//! │                  PlaybackCommand (up)                         │
//! │                  PlaybackMessage (down)                       │
//! └─────────────────────────────┼─────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼─────────────────────────────────┐
//! │                       PRACTICE CORE                            │
//! │  ┌──────────────────────────┴───────────────────────────────┐ │
//! │  │                     PracticeRunner                        │ │
//! │  │   ┌─────────┐   ┌────────────────┐   ┌────────────────┐   │ │
//! │  │   │  Clock  │──▶│ PlaybackEngine │──▶│ CueGate        │   │ │
//! │  │   └─────────┘   │  (transition)  │──▶│ SessionRecorder│   │ │
//! │  │                 └───────▲────────┘   └────────────────┘   │ │
//! │  │                         │                                 │ │
//! │  │                  SequenceSource                           │ │
//! │  └───────────────────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`PlaybackEngine`]: Owns one practice's state and performs effects
//! - [`PracticeRunner`]: Drives an engine from a clock and a command channel
//! - [`transition`]: The pure state-transition function
//! - [`PlaybackCommand`]: Commands from a surface
//! - [`PlaybackMessage`]: Messages to a surface
//! - [`SequenceSource`] / [`SessionRecorder`]: The two service seams
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use practice_core::{
//!     CatalogSequenceSource, EngineOptions, LogRecorder, PlaybackEngine, PracticeRunner,
//!     Settings, SilentCues,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let engine = PlaybackEngine::new(
//!         "sun-salutation".into(),
//!         Settings::default(),
//!         EngineOptions::default(),
//!         Box::new(SilentCues),
//!         Arc::new(LogRecorder),
//!         tx,
//!     );
//!     let (handle, task) = PracticeRunner::new(engine, CatalogSequenceSource::builtin()).spawn();
//!
//!     while let Some(msg) = rx.recv().await {
//!         // Render the message
//!     }
//!     let outcome = task.await.unwrap();
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`config`]: TOML configuration with env and CLI layers
//! - [`cue`]: Audio cue dispatch and the mute gate
//! - [`engine`]: State, transitions, clock and runner
//! - [`events`]: Commands from surfaces
//! - [`messages`]: Messages to surfaces
//! - [`recorder`]: Completed-session recording
//! - [`sequence`]: Poses and sequences
//! - [`settings`]: Player-adjustable settings
//! - [`source`]: Sequence fetching
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cue;
pub mod engine;
pub mod events;
pub mod messages;
pub mod recorder;
pub mod sequence;
pub mod settings;
pub mod source;

// Re-exports for convenience
pub use cue::{Cue, CueDispatcher, CueError, CueGate, SilentCues};
pub use engine::{
    command_channel, transition, Clock, Cursor, Effect, EngineOptions, Phase, PlaybackEngine,
    PlaybackEvent, PlaybackState, PlaybackStatus, PracticeHandle, PracticeOutcome, PracticeRunner,
    Step, TICK_PERIOD,
};
pub use events::PlaybackCommand;
pub use messages::{format_clock, ChangeReason, PlaybackMessage, PlaybackSnapshot};
pub use recorder::{
    HttpSessionRecorder, LogRecorder, MemoryRecorder, SessionRecorder, SessionSummary,
};
pub use sequence::{Level, Pose, Sequence, SequenceError, SequenceId, SequenceRecord};
pub use settings::{SettingKey, SettingUpdate, Settings, SettingsError};
pub use source::{
    CatalogSequenceSource, FailureKind, FetchError, HttpSequenceSource, SequenceSource,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, PracticeConfig, YogaflowToml,
};
