//! Shared test utilities

use std::sync::{Arc, Mutex};

use vortex_breath::Announcer;

/// Announcer that records every phrase instead of speaking it
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    phrases: Mutex<Vec<String>>,
    cancels: Mutex<usize>,
}

impl RecordingAnnouncer {
    /// Create a shared recorder
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Phrases announced so far, in order
    pub fn phrases(&self) -> Vec<String> {
        self.phrases.lock().unwrap().clone()
    }

    /// Number of times speech was cancelled
    pub fn cancels(&self) -> usize {
        *self.cancels.lock().unwrap()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.phrases.lock().unwrap().clear();
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) {
        self.phrases.lock().unwrap().push(text.to_string());
    }

    fn cancel(&self) {
        *self.cancels.lock().unwrap() += 1;
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// The sixteen phrases of an uninterrupted session
#[must_use]
pub fn full_session_phrases() -> Vec<String> {
    let mut phrases = vec![
        "Starting in 3",
        "2",
        "1",
        "Begin. Inhale deeply",
        "Exhale slowly",
    ];
    for _ in 1..6 {
        phrases.push("Inhale deeply");
        phrases.push("Exhale slowly");
    }
    phrases.push("Meditation complete. Take a moment to observe how you feel.");
    phrases.into_iter().map(String::from).collect()
}
