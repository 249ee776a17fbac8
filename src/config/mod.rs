//! Configuration management for Vortex Breath
//!
//! Only the speech backend and output format are configurable; the breathing
//! pattern is a constant.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::{Error, Result};
use file::VortexConfigFile;

/// Default cloud TTS model
const DEFAULT_TTS_MODEL: &str = "tts-1";

/// Default cloud TTS voice
const DEFAULT_TTS_VOICE: &str = "alloy";

/// Which speech backend announces cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceBackend {
    /// Platform speech if available, else silent
    #[default]
    Auto,
    /// Platform speech synthesis
    System,
    /// Hosted TTS played through the speakers; only used when named
    Cloud,
    /// No speech
    None,
}

impl FromStr for VoiceBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "system" => Ok(Self::System),
            "cloud" | "openai" => Ok(Self::Cloud),
            "none" | "off" | "silent" => Ok(Self::None),
            other => Err(format!("unknown voice backend: {other}")),
        }
    }
}

impl std::fmt::Display for VoiceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::System => write!(f, "system"),
            Self::Cloud => write!(f, "cloud"),
            Self::None => write!(f, "none"),
        }
    }
}

/// How snapshots are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable status line
    #[default]
    Text,
    /// One JSON object per snapshot
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Vortex Breath configuration
#[derive(Debug)]
pub struct Config {
    /// Voice configuration
    pub voice: VoiceConfig,

    /// Output configuration
    pub display: DisplayConfig,
}

/// Voice configuration
#[derive(Debug, Default)]
pub struct VoiceConfig {
    /// Selected backend
    pub backend: VoiceBackend,

    /// Explicit speech command for the system backend
    pub command: Option<String>,

    /// TTS model for the cloud backend
    pub tts_model: String,

    /// TTS voice for the cloud backend
    pub tts_voice: String,

    /// `OpenAI` API key for the cloud backend
    pub openai_api_key: Option<SecretString>,
}

/// Output configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayConfig {
    /// Snapshot format
    pub format: OutputFormat,
}

/// Values given on the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Explicit config file; parse failures are errors rather than warnings
    pub config_path: Option<PathBuf>,

    /// Voice backend
    pub voice: Option<VoiceBackend>,

    /// Silence all speech
    pub mute: bool,

    /// Output format
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Load configuration (flags > env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file cannot be loaded or an
    /// environment value is invalid
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let fc = match &overrides.config_path {
            Some(path) => file::read_config_file(path)?,
            None => file::load_config_file(),
        };
        Self::resolve(fc, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge the config file, environment lookup and overrides
    ///
    /// # Errors
    ///
    /// Returns error if a backend or format name is invalid
    pub fn resolve(
        fc: VortexConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let backend = match overrides.voice {
            Some(backend) => backend,
            None => env("VORTEX_VOICE")
                .or(fc.voice.backend)
                .map(|s| s.parse::<VoiceBackend>().map_err(Error::Config))
                .transpose()?
                .unwrap_or_default(),
        };
        let backend = if overrides.mute {
            tracing::info!("voice muted via --mute");
            VoiceBackend::None
        } else {
            backend
        };

        let voice = VoiceConfig {
            backend,
            command: env("VORTEX_VOICE_COMMAND").or(fc.voice.command),
            tts_model: env("VORTEX_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            tts_voice: env("VORTEX_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| DEFAULT_TTS_VOICE.to_string()),
            openai_api_key: env("OPENAI_API_KEY")
                .or(fc.voice.openai_api_key)
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
        };

        let format = match overrides.format {
            Some(format) => format,
            None => env("VORTEX_FORMAT")
                .or(fc.display.format)
                .map(|s| s.parse::<OutputFormat>().map_err(Error::Config))
                .transpose()?
                .unwrap_or_default(),
        };

        Ok(Self {
            voice,
            display: DisplayConfig { format },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::resolve(VortexConfigFile::default(), env_from(&[]), &Overrides::default())
                .unwrap();
        assert_eq!(config.voice.backend, VoiceBackend::Auto);
        assert_eq!(config.voice.tts_model, "tts-1");
        assert_eq!(config.voice.tts_voice, "alloy");
        assert!(config.voice.openai_api_key.is_none());
        assert_eq!(config.display.format, OutputFormat::Text);
    }

    #[test]
    fn test_env_beats_file() {
        let fc: VortexConfigFile =
            toml::from_str("[voice]\nbackend = \"cloud\"\ntts_voice = \"nova\"").unwrap();
        let config = Config::resolve(
            fc,
            env_from(&[("VORTEX_VOICE", "system"), ("VORTEX_FORMAT", "json")]),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.voice.backend, VoiceBackend::System);
        assert_eq!(config.voice.tts_voice, "nova");
        assert_eq!(config.display.format, OutputFormat::Json);
    }

    #[test]
    fn test_flags_beat_env_and_mute_wins() {
        let overrides = Overrides {
            voice: Some(VoiceBackend::Cloud),
            format: Some(OutputFormat::Text),
            ..Overrides::default()
        };
        let env = env_from(&[("VORTEX_VOICE", "system"), ("VORTEX_FORMAT", "json")]);
        let config = Config::resolve(VortexConfigFile::default(), &env, &overrides).unwrap();
        assert_eq!(config.voice.backend, VoiceBackend::Cloud);
        assert_eq!(config.display.format, OutputFormat::Text);

        let muted = Overrides {
            mute: true,
            ..overrides
        };
        let config = Config::resolve(VortexConfigFile::default(), &env, &muted).unwrap();
        assert_eq!(config.voice.backend, VoiceBackend::None);
    }

    #[test]
    fn test_invalid_backend_is_error() {
        let result = Config::resolve(
            VortexConfigFile::default(),
            env_from(&[("VORTEX_VOICE", "telepathy")]),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_api_key_ignored() {
        let config = Config::resolve(
            VortexConfigFile::default(),
            env_from(&[("OPENAI_API_KEY", "")]),
            &Overrides::default(),
        )
        .unwrap();
        assert!(config.voice.openai_api_key.is_none());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!("OpenAI".parse::<VoiceBackend>(), Ok(VoiceBackend::Cloud));
        assert_eq!(" off ".parse::<VoiceBackend>(), Ok(VoiceBackend::None));
        assert_eq!(VoiceBackend::System.to_string(), "system");
    }
}
