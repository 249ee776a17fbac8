//! Pure session transitions
//!
//! Each function takes the current state and returns the next one together
//! with the cues to speak. Timing and speech live in the controller.

use crate::pattern::{COUNTDOWN_SECS, VORTEX_PATTERN};

use super::state::{Phase, SessionState, progress_for};

/// A spoken cue emitted by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Spoken once at start
    StartingIn(u32),
    /// Remaining countdown seconds
    Count(u32),
    /// First inhale of the session
    Begin,
    /// Inhale of every later cycle
    Inhale,
    /// Every exhale
    Exhale,
    /// Natural end of the pattern
    Complete,
    /// User ended the session
    Ended,
}

impl Cue {
    /// Text spoken for this cue
    #[must_use]
    pub fn phrase(&self) -> String {
        match self {
            Self::StartingIn(n) => format!("Starting in {n}"),
            Self::Count(n) => n.to_string(),
            Self::Begin => "Begin. Inhale deeply".to_string(),
            Self::Inhale => "Inhale deeply".to_string(),
            Self::Exhale => "Exhale slowly".to_string(),
            Self::Complete => {
                "Meditation complete. Take a moment to observe how you feel.".to_string()
            }
            Self::Ended => "Meditation ended".to_string(),
        }
    }
}

/// Result of applying one event to a state
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// State after the event
    pub state: SessionState,
    /// Cues to speak, in order
    pub cues: Vec<Cue>,
}

impl Transition {
    const fn quiet(state: SessionState) -> Self {
        Self {
            state,
            cues: Vec::new(),
        }
    }

    fn with_cue(state: SessionState, cue: Cue) -> Self {
        Self {
            state,
            cues: vec![cue],
        }
    }

    /// Whether the tick source should stop after this transition
    #[must_use]
    pub fn is_final(&self) -> bool {
        !self.state.running
    }
}

/// Begin a fresh session regardless of what came before
#[must_use]
pub fn start() -> Transition {
    let state = SessionState {
        phase: Phase::Countdown,
        countdown_remaining: COUNTDOWN_SECS,
        running: true,
        ..SessionState::default()
    };
    Transition::with_cue(state, Cue::StartingIn(COUNTDOWN_SECS))
}

/// End the session from any phase
#[must_use]
pub fn stop() -> Transition {
    Transition::with_cue(SessionState::default(), Cue::Ended)
}

/// Advance the session by one second
///
/// Decrement first, then check for the boundary, so a phase configured as
/// `n` seconds lasts exactly `n` ticks.
#[must_use]
pub fn tick(current: &SessionState) -> Transition {
    let mut next = current.clone();

    match current.phase {
        Phase::Idle | Phase::Complete => Transition::quiet(next),

        Phase::Countdown => {
            next.countdown_remaining = current.countdown_remaining.saturating_sub(1);
            if next.countdown_remaining > 0 {
                let remaining = next.countdown_remaining;
                return Transition::with_cue(next, Cue::Count(remaining));
            }

            next.phase = Phase::Inhale;
            next.cycle_index = 0;
            next.phase_time_remaining = VORTEX_PATTERN[0].inhale;
            next.elapsed_seconds = 0;
            next.progress_percent = 0.0;
            Transition::with_cue(next, Cue::Begin)
        }

        Phase::Inhale | Phase::Exhale => {
            next.phase_time_remaining = current.phase_time_remaining.saturating_sub(1);
            next.elapsed_seconds = current.elapsed_seconds + 1;
            next.progress_percent = progress_for(next.elapsed_seconds);

            if next.phase_time_remaining > 0 {
                return Transition::quiet(next);
            }

            if current.phase == Phase::Inhale {
                // An index past the table has nothing left to breathe
                let Some(cycle) = VORTEX_PATTERN.get(current.cycle_index) else {
                    return complete(next);
                };
                next.phase = Phase::Exhale;
                next.phase_time_remaining = cycle.exhale;
                return Transition::with_cue(next, Cue::Exhale);
            }

            let following = current.cycle_index + 1;
            match VORTEX_PATTERN.get(following) {
                Some(cycle) => {
                    next.phase = Phase::Inhale;
                    next.cycle_index = following;
                    next.phase_time_remaining = cycle.inhale;
                    Transition::with_cue(next, Cue::Inhale)
                }
                None => complete(next),
            }
        }
    }
}

fn complete(mut state: SessionState) -> Transition {
    state.phase = Phase::Complete;
    state.cycle_index = VORTEX_PATTERN.len();
    state.phase_time_remaining = 0;
    state.running = false;
    Transition::with_cue(state, Cue::Complete)
}
