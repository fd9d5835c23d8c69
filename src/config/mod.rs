//! Configuration management for Lipi
//!
//! Values resolve as environment > config file > default. The verification
//! credential is read once, at startup.

pub mod file;

use std::time::Duration;

use secrecy::SecretString;

use crate::card::CardTiming;
use crate::verify::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::voice::DEFAULT_RATE;
use crate::{Error, Result};

/// Lipi configuration
#[derive(Debug)]
pub struct Config {
    /// Gemini API key (`GEMINI_API_KEY`, falling back to `API_KEY`)
    pub api_key: Option<SecretString>,

    /// Verification service configuration
    pub verifier: VerifierConfig,

    /// Reference speech configuration
    pub speech: SpeechConfig,

    /// Card interaction timing
    pub card: CardTiming,
}

/// Verification service configuration
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Model identifier
    pub model: String,

    /// API base URL
    pub base_url: String,

    /// Request deadline
    pub timeout: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Reference speech configuration
#[derive(Debug, Clone, Copy)]
pub struct SpeechConfig {
    /// Speaking rate multiplier
    pub rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self { rate: DEFAULT_RATE }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is out of range
    pub fn load() -> Result<Self> {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is out of range or not a number
    pub fn resolve(
        fc: file::LipiConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = env("GEMINI_API_KEY")
            .or_else(|| env("API_KEY"))
            .or(fc.verifier.api_key)
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        let timeout_secs = match env("LIPI_VERIFY_TIMEOUT_SECS") {
            Some(raw) => Some(parse_number::<u64>("LIPI_VERIFY_TIMEOUT_SECS", &raw)?),
            None => fc.verifier.timeout_secs,
        };
        if timeout_secs == Some(0) {
            return Err(Error::Config(
                "verification timeout must be at least one second".to_string(),
            ));
        }

        let verifier = VerifierConfig {
            model: env("LIPI_MODEL")
                .or(fc.verifier.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env("LIPI_VERIFY_URL")
                .or(fc.verifier.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs),
        };

        let rate = match env("LIPI_SPEECH_RATE") {
            Some(raw) => Some(parse_number::<f32>("LIPI_SPEECH_RATE", &raw)?),
            None => fc.speech.rate,
        }
        .unwrap_or(DEFAULT_RATE);
        if !(rate > 0.1 && rate <= 10.0) {
            return Err(Error::Config(format!(
                "speech rate must be within (0.1, 10], got {rate}"
            )));
        }

        let defaults = CardTiming::default();
        let card = CardTiming {
            result_display: fc
                .card
                .result_display_ms
                .map_or(defaults.result_display, Duration::from_millis),
            english_word_delay: fc
                .card
                .english_word_delay_ms
                .map_or(defaults.english_word_delay, Duration::from_millis),
            bangla_word_delay: fc
                .card
                .bangla_word_delay_ms
                .map_or(defaults.bangla_word_delay, Duration::from_millis),
        };

        Ok(Self {
            api_key,
            verifier,
            speech: SpeechConfig { rate },
            card,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a number, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(file::LipiConfigFile::default(), env_from(&[])).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.verifier.model, "gemini-2.5-flash");
        assert_eq!(config.verifier.timeout, Duration::from_secs(30));
        assert!((config.speech.rate - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.card.result_display, Duration::from_millis(2500));
        assert_eq!(config.card.english_word_delay, Duration::from_millis(500));
        assert_eq!(config.card.bangla_word_delay, Duration::from_millis(700));
    }

    #[test]
    fn test_default_timeout_shared_with_verifier() {
        assert_eq!(VerifierConfig::default().timeout, DEFAULT_TIMEOUT);

        let config = Config::resolve(file::LipiConfigFile::default(), env_from(&[])).unwrap();
        assert_eq!(config.verifier.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut fc = file::LipiConfigFile::default();
        fc.verifier.api_key = Some("from-file".to_string());
        fc.verifier.model = Some("file-model".to_string());

        let config = Config::resolve(
            fc,
            env_from(&[("GEMINI_API_KEY", "from-env"), ("LIPI_MODEL", "env-model")]),
        )
        .unwrap();
        assert_eq!(config.api_key.unwrap().expose_secret(), "from-env");
        assert_eq!(config.verifier.model, "env-model");
    }

    #[test]
    fn test_legacy_key_variable_and_blank_key() {
        let config =
            Config::resolve(file::LipiConfigFile::default(), env_from(&[("API_KEY", "k")]))
                .unwrap();
        assert_eq!(config.api_key.unwrap().expose_secret(), "k");

        let config = Config::resolve(
            file::LipiConfigFile::default(),
            env_from(&[("GEMINI_API_KEY", "  ")]),
        )
        .unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_rate = Config::resolve(
            file::LipiConfigFile::default(),
            env_from(&[("LIPI_SPEECH_RATE", "0")]),
        );
        assert!(matches!(bad_rate, Err(Error::Config(_))));

        let bad_timeout = Config::resolve(
            file::LipiConfigFile::default(),
            env_from(&[("LIPI_VERIFY_TIMEOUT_SECS", "soon")]),
        );
        assert!(matches!(bad_timeout, Err(Error::Config(_))));
    }
}
