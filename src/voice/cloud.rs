//! Speech synthesized by a hosted TTS model and played locally

use std::sync::Arc;

use secrecy::SecretString;

use super::announcer::Announcer;
use super::playback::AudioPlayback;
use super::slot::UtteranceSlot;
use super::tts::TextToSpeech;
use crate::Result;

/// Announcer backed by hosted TTS and the default output device
#[derive(Debug)]
pub struct CloudVoice {
    tts: Arc<TextToSpeech>,
    slot: UtteranceSlot,
}

impl CloudVoice {
    /// Create a cloud voice using `OpenAI` speech
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty
    pub fn new(api_key: SecretString, voice: String, model: String) -> Result<Self> {
        let tts = TextToSpeech::new_openai(api_key, voice, model)?;
        Ok(Self {
            tts: Arc::new(tts),
            slot: UtteranceSlot::new(),
        })
    }
}

impl Announcer for CloudVoice {
    fn announce(&self, text: &str) {
        tracing::debug!(text, "speaking");
        let tts = Arc::clone(&self.tts);
        let text = text.to_string();

        self.slot.replace_with(move |cancellation| async move {
            let audio = match tts.synthesize(&text).await {
                Ok(audio) => audio,
                Err(e) => {
                    tracing::warn!(error = %e, "speech synthesis failed");
                    return;
                }
            };

            if cancellation.is_cancelled() {
                return;
            }

            // cpal streams are not Send; open and drive the device on one thread
            let played = tokio::task::spawn_blocking(move || {
                AudioPlayback::new()?.play_mp3(&audio, &cancellation)
            })
            .await;

            match played {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "speech playback failed"),
                Err(e) => tracing::warn!(error = %e, "speech playback task failed"),
            }
        });
    }

    fn cancel(&self) {
        self.slot.clear();
    }

    fn is_speaking(&self) -> bool {
        self.slot.is_speaking()
    }

    fn name(&self) -> &'static str {
        "cloud"
    }
}
