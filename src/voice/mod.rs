//! Voice announcements
//!
//! Speaks session cues through the platform's speech synthesis, or hosted
//! TTS when asked for by name.
//! Every backend is best-effort: a missing capability turns announcements
//! into no-ops and never affects session timing.

mod announcer;
mod cloud;
mod playback;
#[cfg(not(target_os = "linux"))]
mod platform;
mod slot;
mod system;
mod tts;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

pub use announcer::{Announcer, SPEECH_RATE, SilentVoice};
pub use cloud::CloudVoice;
pub use playback::AudioPlayback;
pub use slot::{Cancellation, Utterance, UtteranceSlot};
pub use system::{SpeechTool, SystemVoice};
pub use tts::TextToSpeech;

use crate::config::{VoiceBackend, VoiceConfig};

/// Build the announcer selected by configuration
///
/// Falls back to [`SilentVoice`] whenever the selected backend is unavailable.
#[must_use]
pub fn from_config(config: &VoiceConfig) -> Arc<dyn Announcer> {
    let announcer: Option<Arc<dyn Announcer>> = match config.backend {
        VoiceBackend::None => None,
        VoiceBackend::Cloud => cloud_voice(config),
        // Auto stays on the device; hosted speech only when named
        VoiceBackend::System | VoiceBackend::Auto => system_voice(config),
    };

    if let Some(announcer) = announcer {
        tracing::info!(backend = announcer.name(), "voice ready");
        return announcer;
    }

    if config.backend != VoiceBackend::None {
        tracing::info!(backend = %config.backend, "no speech backend available, cues will be silent");
    }
    Arc::new(SilentVoice)
}

fn system_voice(config: &VoiceConfig) -> Option<Arc<dyn Announcer>> {
    let voice = match &config.command {
        Some(command) => match SystemVoice::with_command(command) {
            Ok(voice) => Some(voice),
            Err(e) => {
                tracing::warn!(error = %e, "configured speech command unavailable");
                None
            }
        },
        None => SystemVoice::detect(),
    }?;
    Some(Arc::new(voice))
}

fn cloud_voice(config: &VoiceConfig) -> Option<Arc<dyn Announcer>> {
    let key = SecretString::from(config.openai_api_key.as_ref()?.expose_secret().to_owned());
    match CloudVoice::new(key, config.tts_voice.clone(), config.tts_model.clone()) {
        Ok(voice) => Some(Arc::new(voice)),
        Err(e) => {
            tracing::warn!(error = %e, "cloud voice unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_backend_is_silent() {
        let config = VoiceConfig {
            backend: VoiceBackend::None,
            ..VoiceConfig::default()
        };
        assert_eq!(from_config(&config).name(), "silent");
    }

    #[test]
    fn test_cloud_without_key_is_silent() {
        let config = VoiceConfig {
            backend: VoiceBackend::Cloud,
            ..VoiceConfig::default()
        };
        assert_eq!(from_config(&config).name(), "silent");
    }

    #[test]
    fn test_auto_never_selects_cloud() {
        let config = VoiceConfig {
            backend: VoiceBackend::Auto,
            command: Some("definitely-not-a-speech-tool-xyz".to_string()),
            openai_api_key: Some(SecretString::from("sk-test".to_string())),
            ..VoiceConfig::default()
        };
        assert_eq!(from_config(&config).name(), "silent");

        let detected = VoiceConfig {
            command: None,
            ..config
        };
        assert_ne!(from_config(&detected).name(), "cloud");
    }

    #[test]
    fn test_missing_system_command_is_silent() {
        let config = VoiceConfig {
            backend: VoiceBackend::System,
            command: Some("definitely-not-a-speech-tool-xyz".to_string()),
            ..VoiceConfig::default()
        };
        assert_eq!(from_config(&config).name(), "silent");
    }
}
