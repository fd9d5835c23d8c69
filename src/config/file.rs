//! TOML configuration file loading
//!
//! Supports `~/.config/lipi/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct LipiConfigFile {
    /// Pronunciation verification settings
    #[serde(default)]
    pub verifier: VerifierFileConfig,

    /// Reference speech settings
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Card timing settings
    #[serde(default)]
    pub card: CardFileConfig,
}

/// Verification service configuration
#[derive(Debug, Default, Deserialize)]
pub struct VerifierFileConfig {
    /// Gemini API key (the environment takes precedence)
    pub api_key: Option<String>,

    /// Model identifier (e.g. "gemini-2.5-flash")
    pub model: Option<String>,

    /// API base URL
    pub base_url: Option<String>,

    /// Request deadline in seconds
    pub timeout_secs: Option<u64>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Speaking rate multiplier
    pub rate: Option<f32>,
}

/// Card interaction timing
#[derive(Debug, Default, Deserialize)]
pub struct CardFileConfig {
    /// How long a verdict stays visible
    pub result_display_ms: Option<u64>,

    /// Gap between character and word for English items
    pub english_word_delay_ms: Option<u64>,

    /// Gap between character and word for Bangla items
    pub bangla_word_delay_ms: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `LipiConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> LipiConfigFile {
    config_file_path().map_or_else(LipiConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Missing, unreadable, or malformed files yield defaults.
pub fn load_config_file_from(path: &Path) -> LipiConfigFile {
    if !path.exists() {
        return LipiConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                LipiConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            LipiConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/lipi/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("lipi").join("config.toml"))
}
