//! Vortex Breath - Guided breathing meditation with spoken cues
//!
//! A fixed pattern of shrinking inhale/exhale cycles, a three second
//! countdown, and a voice that announces every transition.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              CLI / Renderer                  │
//! │   start  │  end  │  text / JSON snapshots    │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │            Session Controller                │
//! │   1s tick  │  pure machine  │  watch state   │
//! └───────────────────┬──────────────────────────┘
//!                     │ cues
//! ┌───────────────────▼──────────────────────────┐
//! │               Announcer                      │
//! │   system speech  │  cloud TTS  │  silent     │
//! └──────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod pattern;
pub mod session;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use pattern::{BreathCycle, TOTAL_DURATION_SECS, VORTEX_PATTERN};
pub use session::{Cue, Phase, SessionController, SessionState};
pub use voice::Announcer;
