//! Fire-and-forget speech sink

/// Speaking rate relative to the backend's normal rate
pub const SPEECH_RATE: f32 = 0.8;

/// Speaks short phrases without blocking the caller
///
/// A new announcement replaces the one in flight; announcements never
/// queue or overlap. Backend failures are logged, never returned.
pub trait Announcer: Send + Sync {
    /// Cancel the current utterance and start speaking `text`
    fn announce(&self, text: &str);

    /// Stop the current utterance, if any
    fn cancel(&self);

    /// Whether an utterance is still playing
    fn is_speaking(&self) -> bool {
        false
    }

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Announcer used when no speech capability is available
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentVoice;

impl Announcer for SilentVoice {
    fn announce(&self, text: &str) {
        tracing::trace!(text, "no speech backend, skipping announcement");
    }

    fn cancel(&self) {}

    fn name(&self) -> &'static str {
        "silent"
    }
}
