//! Audio Cues
//!
//! Two cues accompany a practice: a warning shortly before a pose ends and a
//! transition cue when the next pose begins. Cues are strictly best-effort.
//!
//! The engine never talks to a [`CueDispatcher`] directly. It goes through a
//! [`CueGate`], which owns the muted flag and swallows every playback error,
//! so a broken audio device cannot stop the countdown.

use thiserror::Error;

/// Which cue to play
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// The current pose is about to end
    Warning,
    /// The next pose has begun
    Transition,
}

/// Cue playback failure
#[derive(Debug, Error)]
pub enum CueError {
    /// No usable output device
    #[error("no audio output available")]
    Unavailable,

    /// Output failed while playing
    #[error("cue playback failed: {0}")]
    Playback(String),
}

/// Something that can make a cue audible
pub trait CueDispatcher: Send {
    /// Dispatcher name for logs
    fn name(&self) -> &str;

    /// Play a cue at `volume` in `[0, 1]`
    ///
    /// # Errors
    ///
    /// Any error is logged and discarded by the [`CueGate`].
    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), CueError>;
}

/// Dispatcher that never makes a sound
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCues;

impl CueDispatcher for SilentCues {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn play(&mut self, _cue: Cue, _volume: f32) -> Result<(), CueError> {
        Ok(())
    }
}

/// Muting, error-swallowing wrapper around a dispatcher
pub struct CueGate {
    dispatcher: Box<dyn CueDispatcher>,
    dispatched: u64,
    failures: u64,
}

impl CueGate {
    /// Wrap a dispatcher
    #[must_use]
    pub fn new(dispatcher: Box<dyn CueDispatcher>) -> Self {
        Self {
            dispatcher,
            dispatched: 0,
            failures: 0,
        }
    }

    /// Warning cue; a no-op while muted
    pub fn on_warning(&mut self, muted: bool, volume: f32) {
        self.dispatch(Cue::Warning, muted, volume);
    }

    /// Transition cue; a no-op while muted
    pub fn on_transition(&mut self, muted: bool, volume: f32) {
        self.dispatch(Cue::Transition, muted, volume);
    }

    /// Cues that reached the dispatcher
    #[must_use]
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Cues the dispatcher failed to play
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    fn dispatch(&mut self, cue: Cue, muted: bool, volume: f32) {
        if muted {
            tracing::trace!(?cue, "Cue suppressed (muted)");
            return;
        }
        self.dispatched += 1;
        if let Err(e) = self.dispatcher.play(cue, volume) {
            self.failures += 1;
            tracing::warn!(
                dispatcher = self.dispatcher.name(),
                ?cue,
                "Cue playback failed: {}",
                e
            );
        }
    }
}

impl std::fmt::Debug for CueGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CueGate")
            .field("dispatcher", &self.dispatcher.name())
            .field("dispatched", &self.dispatched)
            .field("failures", &self.failures)
            .finish()
    }
}
