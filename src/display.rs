//! Text derived from session snapshots, and the renderers that print it

use std::io::Write;

use serde::Serialize;

use crate::config::OutputFormat;
use crate::pattern::{BreathCycle, TOTAL_DURATION_SECS, VORTEX_PATTERN};
use crate::session::{Phase, SessionState};
use crate::Result;

/// Title shown before breathing starts
pub const TITLE: &str = "Vortex Breath Meditation";

/// Width of the text progress bar in cells
const BAR_WIDTH: usize = 30;

/// Main instruction for the current phase
#[must_use]
pub fn instruction_text(state: &SessionState) -> String {
    match state.phase {
        Phase::Countdown => format!("Starting in {}...", state.countdown_remaining),
        Phase::Inhale => format!("Inhale ({}s)", state.phase_time_remaining),
        Phase::Exhale => format!("Exhale ({}s)", state.phase_time_remaining),
        Phase::Complete => "Meditation complete".to_string(),
        Phase::Idle => "Press Start to begin".to_string(),
    }
}

/// Description of the cycle being breathed
#[must_use]
pub fn cycle_info(state: &SessionState) -> String {
    match state.phase {
        Phase::Idle | Phase::Countdown => TITLE.to_string(),
        Phase::Complete => "Practice completed".to_string(),
        Phase::Inhale | Phase::Exhale => state.current_cycle().map_or_else(
            || TITLE.to_string(),
            |cycle| {
                format!(
                    "Cycle {} of {}: {}s inhale, {}s exhale",
                    state.cycle_index + 1,
                    VORTEX_PATTERN.len(),
                    cycle.inhale,
                    cycle.exhale
                )
            },
        ),
    }
}

/// Progress as a fixed-width bar with a percentage
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn progress_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// The pattern as a list, one line per cycle
#[must_use]
pub fn pattern_lines() -> Vec<String> {
    VORTEX_PATTERN
        .iter()
        .map(|c| format!("Inhale {}s, Exhale {}s", c.inhale, c.exhale))
        .collect()
}

/// Everything a presentation layer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame<'a> {
    /// Raw session state
    #[serde(flatten)]
    pub state: &'a SessionState,
    /// Instruction line
    pub instruction: String,
    /// Cycle description line
    pub cycle: String,
}

impl<'a> Frame<'a> {
    /// Derive a frame from a snapshot
    #[must_use]
    pub fn new(state: &'a SessionState) -> Self {
        Self {
            state,
            instruction: instruction_text(state),
            cycle: cycle_info(state),
        }
    }
}

/// The pattern table as one JSON object
#[derive(Debug, Clone, Serialize)]
pub struct PatternOverview {
    /// Cycles in order
    pub pattern: &'static [BreathCycle],
    /// Seconds of breathing across all cycles
    pub total_duration_secs: u32,
}

impl Default for PatternOverview {
    fn default() -> Self {
        Self {
            pattern: &VORTEX_PATTERN,
            total_duration_secs: TOTAL_DURATION_SECS,
        }
    }
}

/// Writes frames to an output stream
pub struct Renderer<W: Write> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> Renderer<W> {
    /// Create a renderer
    pub const fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    /// Write one snapshot
    ///
    /// # Errors
    ///
    /// Returns error if writing or serialization fails
    pub fn render(&mut self, state: &SessionState) -> Result<()> {
        let frame = Frame::new(state);
        match self.format {
            OutputFormat::Text => writeln!(
                self.out,
                "{:<24} {}  {}",
                frame.instruction,
                progress_bar(state.progress_percent),
                frame.cycle
            )?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &frame)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Write the pattern overview shown while idle
    ///
    /// # Errors
    ///
    /// Returns error if writing or serialization fails
    pub fn render_pattern(&mut self) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "The Vortex Breath Pattern:")?;
                for line in pattern_lines() {
                    writeln!(self.out, "  - {line}")?;
                }
                writeln!(self.out, "Total: {TOTAL_DURATION_SECS}s of breathing")?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, &PatternOverview::default())?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Consume the renderer, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::machine;

    fn after_ticks(n: usize) -> SessionState {
        let mut state = machine::start().state;
        for _ in 0..n {
            state = machine::tick(&state).state;
        }
        state
    }

    #[test]
    fn test_instruction_per_phase() {
        assert_eq!(instruction_text(&SessionState::default()), "Press Start to begin");
        assert_eq!(instruction_text(&after_ticks(0)), "Starting in 3...");
        assert_eq!(instruction_text(&after_ticks(1)), "Starting in 2...");
        assert_eq!(instruction_text(&after_ticks(3)), "Inhale (13s)");
        assert_eq!(instruction_text(&after_ticks(16)), "Exhale (13s)");
        assert_eq!(instruction_text(&after_ticks(67)), "Meditation complete");
    }

    #[test]
    fn test_cycle_info_per_phase() {
        assert_eq!(cycle_info(&after_ticks(0)), TITLE);
        assert_eq!(
            cycle_info(&after_ticks(3)),
            "Cycle 1 of 6: 13s inhale, 13s exhale"
        );
        assert_eq!(
            cycle_info(&after_ticks(29)),
            "Cycle 2 of 6: 8s inhale, 8s exhale"
        );
        assert_eq!(cycle_info(&after_ticks(67)), "Practice completed");
    }

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0.0), format!("[{}]   0%", "-".repeat(30)));
        assert_eq!(progress_bar(100.0), format!("[{}] 100%", "#".repeat(30)));
        assert_eq!(progress_bar(250.0), progress_bar(100.0));
        assert!(progress_bar(50.0).starts_with(&format!("[{}-", "#".repeat(15))));
    }

    #[test]
    fn test_pattern_lines() {
        let lines = pattern_lines();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Inhale 13s, Exhale 13s");
        assert_eq!(lines[5], "Inhale 1s, Exhale 1s");
    }

    #[test]
    fn test_json_render_is_one_line_per_frame() {
        let mut renderer = Renderer::new(Vec::new(), OutputFormat::Json);
        renderer.render(&after_ticks(3)).unwrap();
        renderer.render(&after_ticks(4)).unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let frame: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(frame["phase"], "inhale");
        assert_eq!(frame["phase_time_remaining"], 12);
        assert_eq!(frame["instruction"], "Inhale (12s)");
        assert_eq!(frame["cycle"], "Cycle 1 of 6: 13s inhale, 13s exhale");
    }

    #[test]
    fn test_json_pattern_is_one_object() {
        let mut renderer = Renderer::new(Vec::new(), OutputFormat::Json);
        renderer.render_pattern().unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);

        let overview: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(overview["total_duration_secs"], 64);
        assert_eq!(overview["pattern"].as_array().map(Vec::len), Some(6));
        assert_eq!(overview["pattern"][0]["inhale"], 13);
        assert_eq!(overview["pattern"][5]["exhale"], 1);
    }

    #[test]
    fn test_text_pattern_lists_cycles() {
        let mut renderer = Renderer::new(Vec::new(), OutputFormat::Text);
        renderer.render_pattern().unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("  - Inhale 13s, Exhale 13s"));
        assert!(out.trim_end().ends_with("Total: 64s of breathing"));
    }

    #[test]
    fn test_text_render() {
        let mut renderer = Renderer::new(Vec::new(), OutputFormat::Text);
        renderer.render(&after_ticks(1)).unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with("Starting in 2..."));
        assert!(out.trim_end().ends_with(TITLE));
    }
}
