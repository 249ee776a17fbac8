//! Session state observed by the display layer

use serde::Serialize;

use crate::pattern::{BreathCycle, COUNTDOWN_SECS, TOTAL_DURATION_SECS, VORTEX_PATTERN};

/// Macro-state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No session, waiting for start
    #[default]
    Idle,
    /// Pre-roll countdown before breathing
    Countdown,
    /// Breathing in
    Inhale,
    /// Breathing out
    Exhale,
    /// All cycles done
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Countdown => write!(f, "countdown"),
            Self::Inhale => write!(f, "inhale"),
            Self::Exhale => write!(f, "exhale"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Snapshot of a meditation session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the countdown
    pub countdown_remaining: u32,
    /// Index into the pattern; equals the pattern length only once complete
    pub cycle_index: usize,
    /// Seconds left in the current inhale or exhale
    pub phase_time_remaining: u32,
    /// Breathing seconds elapsed since the countdown ended
    pub elapsed_seconds: u32,
    /// Share of the pattern completed, 0 to 100
    pub progress_percent: f64,
    /// Whether a session is in progress (start offered when false)
    pub running: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            countdown_remaining: COUNTDOWN_SECS,
            cycle_index: 0,
            phase_time_remaining: 0,
            elapsed_seconds: 0,
            progress_percent: 0.0,
            running: false,
        }
    }
}

impl SessionState {
    /// The cycle being breathed, if the session is in one
    #[must_use]
    pub fn current_cycle(&self) -> Option<BreathCycle> {
        match self.phase {
            Phase::Inhale | Phase::Exhale => VORTEX_PATTERN.get(self.cycle_index).copied(),
            _ => None,
        }
    }

    /// Whether the session has reached its terminal phase
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

/// Progress for a number of elapsed breathing seconds
#[must_use]
pub fn progress_for(elapsed_seconds: u32) -> f64 {
    f64::from(elapsed_seconds) / f64::from(TOTAL_DURATION_SECS) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(!state.running);
        assert_eq!(state.countdown_remaining, 3);
        assert!(state.current_cycle().is_none());
    }

    #[test]
    fn test_progress_bounds() {
        assert!(progress_for(0).abs() < f64::EPSILON);
        assert!((progress_for(32) - 50.0).abs() < f64::EPSILON);
        assert!((progress_for(TOTAL_DURATION_SECS) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        let json = serde_json::to_string(&Phase::Countdown).unwrap();
        assert_eq!(json, "\"countdown\"");
    }
}
