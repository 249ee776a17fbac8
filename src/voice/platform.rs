//! Speech through the operating system's synthesizer
//!
//! The engine handle is not thread-safe on every platform, so it lives on a
//! dedicated thread and takes requests over a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use super::announcer::SPEECH_RATE;
use crate::{Error, Result};

/// How often the speech thread refreshes its speaking flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

enum Request {
    Speak(String),
    Stop,
}

/// Handle to the speech thread
#[derive(Debug)]
pub struct PlatformSpeech {
    requests: Sender<Request>,
    speaking: Arc<AtomicBool>,
}

impl PlatformSpeech {
    /// Open the default synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if the platform has no usable synthesizer
    pub fn new() -> Result<Self> {
        let (requests, inbox) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let speaking = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&speaking);

        thread::Builder::new()
            .name("vortex-speech".to_string())
            .spawn(move || {
                let engine = match open_engine() {
                    Ok(engine) => {
                        let _ = ready_tx.send(Ok(()));
                        engine
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                serve(engine, &inbox, &flag);
            })?;

        ready_rx
            .recv()
            .map_err(|_| Error::Voice("speech thread exited during startup".to_string()))??;

        tracing::debug!("platform synthesizer ready");
        Ok(Self { requests, speaking })
    }

    /// Interrupt whatever is playing and speak `text`
    pub fn speak(&self, text: &str) {
        self.speaking.store(true, Ordering::SeqCst);
        if self.requests.send(Request::Speak(text.to_string())).is_err() {
            self.speaking.store(false, Ordering::SeqCst);
            tracing::warn!("speech thread gone, dropping announcement");
        }
    }

    /// Silence the synthesizer
    pub fn stop(&self) {
        self.speaking.store(false, Ordering::SeqCst);
        let _ = self.requests.send(Request::Stop);
    }

    /// Whether the synthesizer is still talking
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }
}

fn open_engine() -> Result<tts::Tts> {
    let mut engine = tts::Tts::default()
        .map_err(|e| Error::Voice(format!("speech synthesizer unavailable: {e}")))?;

    let rate = (engine.normal_rate() * SPEECH_RATE).clamp(engine.min_rate(), engine.max_rate());
    if let Err(e) = engine.set_rate(rate) {
        tracing::warn!(error = %e, "synthesizer ignores rate, speaking at normal speed");
    }
    Ok(engine)
}

/// Handle requests until every sender is gone
fn serve(mut engine: tts::Tts, inbox: &Receiver<Request>, speaking: &AtomicBool) {
    loop {
        match inbox.recv_timeout(POLL_INTERVAL) {
            Ok(Request::Speak(text)) => {
                if let Err(e) = engine.speak(text, true) {
                    tracing::warn!(error = %e, "speech synthesis failed");
                }
            }
            Ok(Request::Stop) => {
                if let Err(e) = engine.stop() {
                    tracing::warn!(error = %e, "failed to stop speech");
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        speaking.store(engine.is_speaking().unwrap_or(false), Ordering::SeqCst);
    }

    let _ = engine.stop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_clears_speaking() {
        // CI machines may have no synthesizer at all
        let Ok(speech) = PlatformSpeech::new() else {
            return;
        };
        speech.speak("Inhale deeply");
        speech.stop();

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while speech.is_speaking() && std::time::Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
        }
        assert!(!speech.is_speaking());
    }
}
