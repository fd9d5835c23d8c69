//! User-facing notices
//!
//! Failures never abort an interaction; they are reported through a
//! [`Notifier`] and the card returns to a valid state.

use std::sync::atomic::{AtomicBool, Ordering};

/// Something the learner should be told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Microphone access was refused or no input device exists
    MicrophoneUnavailable,
    /// The capture device failed while starting or stopping
    DeviceFailure,
    /// No verification credential is configured
    MissingCredential,
    /// The verification request failed
    VerificationFailed,
    /// No text-to-speech engine is available
    SpeechUnsupported,
}

impl Notice {
    /// Message shown to the learner
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MicrophoneUnavailable => {
                "Could not start recording. Please ensure microphone permissions are \
                 granted and that an input device is connected."
            }
            Self::DeviceFailure => "The microphone stopped unexpectedly. Please try again.",
            Self::MissingCredential => {
                "Gemini API key is not configured. Pronunciation check is disabled."
            }
            Self::VerificationFailed => {
                "There was an error checking the pronunciation. Please try again."
            }
            Self::SpeechUnsupported => "Sorry, text-to-speech is not available on this system.",
        }
    }
}

/// Delivers notices to the learner
pub trait Notifier: Send + Sync {
    /// Surface a notice
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(?notice, "notice raised");
        eprintln!("! {}", notice.message());
    }
}

/// Tracks whether a warning has already been shown
#[derive(Debug, Default)]
pub struct WarnOnce(AtomicBool);

impl WarnOnce {
    /// Create an unfired flag
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Returns true only for the first caller
    pub fn first(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}
