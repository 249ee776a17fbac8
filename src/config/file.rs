//! TOML configuration file loading
//!
//! Supports `~/.config/vortex-breath/config.toml` as a persistent config source.
//! All fields are optional: the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VortexConfigFile {
    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Output configuration
    #[serde(default)]
    pub display: DisplayFileConfig,
}

/// Voice configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Backend selection ("auto", "system", "cloud", "none")
    pub backend: Option<String>,

    /// Speech command for the system backend (e.g. "espeak-ng")
    pub command: Option<String>,

    /// TTS model for the cloud backend (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// `OpenAI` API key for the cloud backend
    pub openai_api_key: Option<String>,
}

/// Output configuration
#[derive(Debug, Default, Deserialize)]
pub struct DisplayFileConfig {
    /// Output format ("text" or "json")
    pub format: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VortexConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> VortexConfigFile {
    let Some(path) = config_file_path() else {
        return VortexConfigFile::default();
    };

    if !path.exists() {
        return VortexConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            VortexConfigFile::default()
        }
    }
}

/// Read and parse a config file at an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn read_config_file(path: &Path) -> Result<VortexConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/vortex-breath/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("vortex-breath").join("config.toml"))
}
