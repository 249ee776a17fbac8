//! Meditation session
//!
//! [`machine`] holds the pure transitions, [`controller`] runs them on a
//! timer and routes cues to an announcer.

pub mod controller;
pub mod machine;
pub mod state;

pub use controller::{SessionController, TICK_PERIOD};
pub use machine::{Cue, Transition};
pub use state::{Phase, SessionState};
