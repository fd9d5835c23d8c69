//! Error types for Lipi

use thiserror::Error;

/// Result type alias for Lipi operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Lipi
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Microphone access refused or no input device present
    #[error("microphone unavailable: {0}")]
    PermissionDenied(String),

    /// Capture device failed to start or stop
    #[error("device error: {0}")]
    Device(String),

    /// Audio encoding or playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// Text-to-speech error
    #[error("speech error: {0}")]
    Speech(String),

    /// Pronunciation verification error
    #[error("verification error: {0}")]
    Verification(String),

    /// Unknown category or item
    #[error("catalog error: {0}")]
    Catalog(String),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
