//! The Transition Function
//!
//! `transition(&state, event) -> Step` is the whole state machine. It is
//! pure: no clocks, no audio, no channels. Ticks and commands both arrive
//! here as [`PlaybackEvent`]s, so there is exactly one place where the state
//! can change and no way for two sources to interleave inside a step.
//!
//! ```text
//! Loading --Loaded--> Running(0)            (or Ready when lead-in is on)
//! Loading --LoadFailed--> Failed
//! Ready   --Tick, remaining>1--> Ready(remaining-1)
//! Ready   --Tick, remaining<=1--> Running(0) + TransitionCue
//! Running --Tick, remaining>1--> Running(remaining-1) [+ Warning once]
//! Running --Tick, remaining<=1--> TransitionCue; Running(i+1) | Completed
//! Running --Pause--> Paused --Resume--> Running
//! Running|Paused --Skip--> Running(i±1)     (no-op at the ends)
//! non-terminal --Exit--> Exited
//! ```
//!
//! Mute and settings changes apply in every phase and never touch the
//! countdown.

use std::sync::Arc;

use crate::events::PlaybackCommand;
use crate::messages::ChangeReason;
use crate::sequence::Sequence;
use crate::settings::SettingKey;
use crate::source::FailureKind;

use super::state::{Cursor, Phase, PlaybackState};

/// Input to the state machine
#[derive(Clone, Debug)]
pub enum PlaybackEvent {
    /// The sequence arrived
    Loaded(Arc<Sequence>),
    /// The fetch failed
    LoadFailed(FailureKind),
    /// One clock period elapsed
    Tick,
    /// A surface command
    Command(PlaybackCommand),
}

/// Side effects requested by a step, in the order they must happen
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Sequence accepted
    Loaded,
    /// Lead-in countdown began
    LeadIn {
        /// Seconds until the first pose
        seconds: u32,
    },
    /// New pose under the cursor
    PoseChanged {
        /// New index
        index: usize,
        /// Why
        reason: ChangeReason,
    },
    /// Play the warning cue and preview `next_index`
    Warning {
        /// Upcoming pose
        next_index: usize,
    },
    /// Play the transition cue
    TransitionCue,
    /// Countdown frozen
    Paused,
    /// Countdown continuing
    Resumed,
    /// Final pose expired; hand the summary to the recorder
    Completed,
    /// Fetch failed
    Failed(FailureKind),
    /// Player left
    Exited,
    /// Mute flag flipped
    MuteChanged(bool),
    /// Setting updated
    SettingChanged {
        /// Which setting
        key: SettingKey,
        /// Whether the value was clamped
        clamped: bool,
    },
}

/// Result of applying one event
#[derive(Clone, Debug)]
pub struct Step {
    /// State after the event
    pub state: PlaybackState,
    /// Effects to perform, in order
    pub effects: Vec<Effect>,
}

impl Step {
    fn unchanged(state: &PlaybackState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    /// Whether the event produced no effects
    ///
    /// A plain countdown tick changes the state but has no effects.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Apply one event to a state
#[must_use]
pub fn transition(state: &PlaybackState, event: PlaybackEvent) -> Step {
    match event {
        PlaybackEvent::Loaded(sequence) => on_loaded(state, sequence),
        PlaybackEvent::LoadFailed(kind) => on_load_failed(state, kind),
        PlaybackEvent::Tick => on_tick(state),
        PlaybackEvent::Command(command) => on_command(state, command),
    }
}

fn on_loaded(state: &PlaybackState, sequence: Arc<Sequence>) -> Step {
    if !matches!(state.phase, Phase::Loading) {
        return Step::unchanged(state);
    }

    let mut next = state.clone();
    let mut effects = vec![Effect::Loaded];

    if state.lead_in {
        let seconds = state.settings.preparation_time_seconds;
        next.phase = Phase::Ready { remaining: seconds };
        effects.push(Effect::LeadIn { seconds });
    } else {
        next.phase = Phase::Running(Cursor::start(&sequence.poses()[0], 0));
        effects.push(Effect::PoseChanged {
            index: 0,
            reason: ChangeReason::Start,
        });
    }
    next.sequence = Some(sequence);

    Step {
        state: next,
        effects,
    }
}

fn on_load_failed(state: &PlaybackState, kind: FailureKind) -> Step {
    if !matches!(state.phase, Phase::Loading) {
        return Step::unchanged(state);
    }
    let mut next = state.clone();
    next.phase = Phase::Failed(kind);
    Step {
        state: next,
        effects: vec![Effect::Failed(kind)],
    }
}

fn on_tick(state: &PlaybackState) -> Step {
    let Some(sequence) = state.sequence.as_ref() else {
        return Step::unchanged(state);
    };

    let mut next = state.clone();
    let mut effects = Vec::new();

    match state.phase {
        Phase::Ready { remaining } if remaining > 1 => {
            next.phase = Phase::Ready {
                remaining: remaining - 1,
            };
        }
        Phase::Ready { .. } => {
            next.phase = Phase::Running(Cursor::start(&sequence.poses()[0], 0));
            effects.push(Effect::TransitionCue);
            effects.push(Effect::PoseChanged {
                index: 0,
                reason: ChangeReason::Start,
            });
        }
        Phase::Running(cursor) if cursor.remaining > 1 => {
            let mut cursor = cursor;
            cursor.remaining -= 1;

            let threshold = state.settings.transition_warning_seconds;
            if !cursor.warning_shown
                && cursor.index < sequence.last_index()
                && cursor.remaining <= threshold
            {
                cursor.warning_shown = true;
                effects.push(Effect::Warning {
                    next_index: cursor.index + 1,
                });
            }
            next.phase = Phase::Running(cursor);
        }
        Phase::Running(cursor) => {
            // A one-second pose never passes through the decrement branch
            if !cursor.warning_shown && cursor.index < sequence.last_index() {
                effects.push(Effect::Warning {
                    next_index: cursor.index + 1,
                });
            }
            effects.push(Effect::TransitionCue);
            let index = cursor.index + 1;
            match sequence.pose(index) {
                Some(pose) => {
                    next.phase = Phase::Running(Cursor::start(pose, index));
                    effects.push(Effect::PoseChanged {
                        index,
                        reason: ChangeReason::Natural,
                    });
                }
                None => {
                    next.phase = Phase::Completed;
                    effects.push(Effect::Completed);
                }
            }
        }
        Phase::Loading
        | Phase::Paused(_)
        | Phase::Completed
        | Phase::Failed(_)
        | Phase::Exited => return Step::unchanged(state),
    }

    // Plain decrements change state without producing effects
    Step {
        state: next,
        effects,
    }
}

fn on_command(state: &PlaybackState, command: PlaybackCommand) -> Step {
    match command {
        PlaybackCommand::Pause => match state.phase {
            Phase::Running(cursor) => with_phase(state, Phase::Paused(cursor), Effect::Paused),
            _ => Step::unchanged(state),
        },
        PlaybackCommand::Resume => match state.phase {
            Phase::Paused(cursor) => with_phase(state, Phase::Running(cursor), Effect::Resumed),
            _ => Step::unchanged(state),
        },
        PlaybackCommand::TogglePause => match state.phase {
            Phase::Running(_) => on_command(state, PlaybackCommand::Pause),
            Phase::Paused(_) => on_command(state, PlaybackCommand::Resume),
            _ => Step::unchanged(state),
        },
        PlaybackCommand::SkipForward => skip(state, true),
        PlaybackCommand::SkipBackward => skip(state, false),
        PlaybackCommand::Exit => {
            if state.is_terminal() {
                Step::unchanged(state)
            } else {
                with_phase(state, Phase::Exited, Effect::Exited)
            }
        }
        PlaybackCommand::ToggleMute => {
            let mut next = state.clone();
            next.muted = !state.muted;
            let muted = next.muted;
            Step {
                state: next,
                effects: vec![Effect::MuteChanged(muted)],
            }
        }
        PlaybackCommand::UpdateSetting { update } => {
            let mut next = state.clone();
            let clamped = next.settings.apply(update);
            Step {
                state: next,
                effects: vec![Effect::SettingChanged {
                    key: update.key(),
                    clamped,
                }],
            }
        }
    }
}

fn with_phase(state: &PlaybackState, phase: Phase, effect: Effect) -> Step {
    let mut next = state.clone();
    next.phase = phase;
    Step {
        state: next,
        effects: vec![effect],
    }
}

fn skip(state: &PlaybackState, forward: bool) -> Step {
    let (Some(cursor), Some(sequence)) = (state.phase.cursor(), state.sequence.as_ref()) else {
        return Step::unchanged(state);
    };

    let target = if forward {
        cursor.index + 1
    } else {
        match cursor.index.checked_sub(1) {
            Some(i) => i,
            None => return Step::unchanged(state),
        }
    };
    let Some(pose) = sequence.pose(target) else {
        return Step::unchanged(state);
    };

    let reason = if forward {
        ChangeReason::SkipForward
    } else {
        ChangeReason::SkipBackward
    };
    let mut effects = Vec::new();
    if matches!(state.phase, Phase::Paused(_)) {
        effects.push(Effect::Resumed);
    }
    effects.push(Effect::PoseChanged {
        index: target,
        reason,
    });

    let mut next = state.clone();
    next.phase = Phase::Running(Cursor::start(pose, target));
    Step {
        state: next,
        effects,
    }
}
