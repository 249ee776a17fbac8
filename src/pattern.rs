//! The vortex breathing pattern
//!
//! Six inhale/exhale pairs of shrinking length. The table is a process-wide
//! constant; nothing at runtime may alter it.

use serde::Serialize;

/// One inhale + exhale pair, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreathCycle {
    /// Inhale length in seconds
    pub inhale: u32,
    /// Exhale length in seconds
    pub exhale: u32,
}

impl BreathCycle {
    /// Create a cycle
    #[must_use]
    pub const fn new(inhale: u32, exhale: u32) -> Self {
        Self { inhale, exhale }
    }

    /// Seconds spent in this cycle
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.inhale + self.exhale
    }
}

/// The vortex pattern, longest cycle first
pub const VORTEX_PATTERN: [BreathCycle; 6] = [
    BreathCycle::new(13, 13),
    BreathCycle::new(8, 8),
    BreathCycle::new(5, 5),
    BreathCycle::new(3, 3),
    BreathCycle::new(2, 2),
    BreathCycle::new(1, 1),
];

/// Total breathing time of the pattern in seconds
pub const TOTAL_DURATION_SECS: u32 = total_duration(&VORTEX_PATTERN);

/// Pre-roll countdown length in seconds
pub const COUNTDOWN_SECS: u32 = 3;

const fn total_duration(pattern: &[BreathCycle]) -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < pattern.len() {
        total += pattern[i].duration();
        i += 1;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_duration_matches_pattern_sum() {
        let sum: u32 = VORTEX_PATTERN.iter().map(BreathCycle::duration).sum();
        assert_eq!(sum, TOTAL_DURATION_SECS);
        assert_eq!(TOTAL_DURATION_SECS, 64);
    }

    #[test]
    fn test_pattern_is_symmetric_and_shrinking() {
        for cycle in VORTEX_PATTERN {
            assert!(cycle.inhale > 0);
            assert_eq!(cycle.inhale, cycle.exhale);
        }
        assert!(VORTEX_PATTERN.windows(2).all(|w| w[0].inhale > w[1].inhale));
    }
}
