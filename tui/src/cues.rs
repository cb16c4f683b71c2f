//! Terminal Cues
//!
//! The terminal bell is the only sound a plain terminal can make, so both
//! cues ring it: once for the warning, twice for a transition. There is no
//! volume control for a bell; a volume of zero silences it.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::Print;

use practice_core::{Cue, CueDispatcher, CueError};

const BELL: char = '\x07';

/// Cue dispatcher that rings the terminal bell
pub struct TerminalBell<W = io::Stdout> {
    out: W,
}

impl TerminalBell {
    /// Ring the bell on stdout
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalBell<W> {
    /// Ring the bell on any writer
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the dispatcher, returning its writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> CueDispatcher for TerminalBell<W> {
    fn name(&self) -> &str {
        "bell"
    }

    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), CueError> {
        if volume <= 0.0 {
            return Ok(());
        }
        let rings = match cue {
            Cue::Warning => 1,
            Cue::Transition => 2,
        };
        for _ in 0..rings {
            queue!(self.out, Print(BELL)).map_err(|e| CueError::Playback(e.to_string()))?;
        }
        self.out
            .flush()
            .map_err(|e| CueError::Playback(e.to_string()))
    }
}
