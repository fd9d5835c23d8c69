//! Text-to-speech output
//!
//! [`Speaker`] implements the speak contract on top of a platform
//! [`SpeechEngine`]: at most one utterance is audible at a time, and a voice
//! matching the requested language is preferred when the platform has one.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, OnceLock};

use crate::notice::{Notice, Notifier};
use crate::{Error, Result};

/// Default speaking rate multiplier
pub const DEFAULT_RATE: f32 = 0.9;

/// espeak speaking rate at a multiplier of 1.0, in words per minute
const ESPEAK_BASE_WPM: f32 = 175.0;

/// A voice offered by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Engine-specific voice identifier
    pub name: String,

    /// Language tag the voice speaks (e.g. "en-US")
    pub language: String,
}

/// One request to speak text
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Text to speak
    pub text: String,

    /// Requested language tag
    pub language: String,

    /// Rate multiplier (1.0 is normal speed)
    pub rate: f32,

    /// Voice to use; `None` means the platform default
    pub voice: Option<Voice>,
}

/// Platform text-to-speech primitive
pub trait SpeechEngine: Send + Sync {
    /// Voices the platform can speak with
    fn voices(&self) -> Vec<Voice>;

    /// Silence whatever is currently being spoken
    fn cancel(&self);

    /// Begin speaking without waiting for the audio to finish
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot start
    fn speak(&self, utterance: &Utterance) -> Result<()>;
}

/// Fire-and-forget speech output
pub trait SpeechOutput: Send + Sync {
    /// Speak `text` in the given language
    fn speak(&self, text: &str, language: &str);
}

/// Speech output adapter over an optional platform engine
pub struct Speaker {
    engine: Option<Arc<dyn SpeechEngine>>,
    notifier: Arc<dyn Notifier>,
    rate: f32,
}

impl Speaker {
    /// Create a speaker; `engine` is `None` when the platform cannot speak
    #[must_use]
    pub fn new(
        engine: Option<Arc<dyn SpeechEngine>>,
        notifier: Arc<dyn Notifier>,
        rate: f32,
    ) -> Self {
        Self {
            engine,
            notifier,
            rate,
        }
    }

    /// Create a speaker using the system espeak engine if one is installed
    #[must_use]
    pub fn system(notifier: Arc<dyn Notifier>, rate: f32) -> Self {
        let engine = EspeakEngine::detect().map(|e| Arc::new(e) as Arc<dyn SpeechEngine>);
        if engine.is_none() {
            tracing::warn!("no speech engine found (tried espeak-ng, espeak)");
        }
        Self::new(engine, notifier, rate)
    }

    /// Whether a speech engine is available
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }
}

impl SpeechOutput for Speaker {
    fn speak(&self, text: &str, language: &str) {
        let Some(engine) = &self.engine else {
            tracing::error!("speech synthesis not supported on this platform");
            self.notifier.notify(Notice::SpeechUnsupported);
            return;
        };

        let voice = select_voice(&engine.voices(), language);
        let utterance = Utterance {
            text: text.to_string(),
            language: language.to_string(),
            rate: self.rate,
            voice,
        };

        engine.cancel();
        if let Err(e) = engine.speak(&utterance) {
            tracing::error!(error = %e, text, language, "failed to speak");
        } else {
            tracing::debug!(text, language, voice = ?utterance.voice, "speaking");
        }
    }
}

impl std::fmt::Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker")
            .field("supported", &self.engine.is_some())
            .field("rate", &self.rate)
            .finish_non_exhaustive()
    }
}

/// Pick the first voice whose language matches the tag, ignoring case
///
/// Falls back to a voice tagged with just the primary language ("bn" for
/// "bn-BD"); voices for a different region are never chosen.
#[must_use]
pub fn select_voice(voices: &[Voice], language: &str) -> Option<Voice> {
    let wanted = normalize_tag(language);
    let primary = wanted.split_once('-').map_or(wanted.as_str(), |(p, _)| p);
    voices
        .iter()
        .find(|v| normalize_tag(&v.language) == wanted)
        .or_else(|| voices.iter().find(|v| normalize_tag(&v.language) == primary))
        .cloned()
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

/// espeak-ng (or classic espeak) driven as a child process
pub struct EspeakEngine {
    program: PathBuf,
    voices: OnceLock<Vec<Voice>>,
    current: Mutex<Option<Child>>,
}

impl EspeakEngine {
    /// Locate an espeak binary on `PATH`
    #[must_use]
    pub fn detect() -> Option<Self> {
        ["espeak-ng", "espeak"]
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|program| {
                tracing::debug!(program = %program.display(), "speech engine found");
                Self {
                    program,
                    voices: OnceLock::new(),
                    current: Mutex::new(None),
                }
            })
    }

    fn load_voices(&self) -> Vec<Voice> {
        match Command::new(&self.program).arg("--voices").output() {
            Ok(output) if output.status.success() => {
                parse_voice_list(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::warn!(status = %output.status, "espeak voice listing failed");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to list espeak voices");
                Vec::new()
            }
        }
    }
}

impl SpeechEngine for EspeakEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.get_or_init(|| self.load_voices()).clone()
    }

    fn cancel(&self) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        if let Some(mut child) = current.take() {
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
                tracing::trace!("cancelled in-flight utterance");
            }
            let _ = child.wait();
        }
    }

    fn speak(&self, utterance: &Utterance) -> Result<()> {
        let voice = utterance
            .voice
            .as_ref()
            .map_or_else(|| normalize_tag(&utterance.language), |v| v.name.clone());

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let wpm = (ESPEAK_BASE_WPM * utterance.rate).round().max(80.0) as u32;

        let child = Command::new(&self.program)
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(wpm.to_string())
            .arg("--")
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Speech(format!("failed to start espeak: {e}")))?;

        if let Ok(mut current) = self.current.lock() {
            *current = Some(child);
        }
        Ok(())
    }
}

/// Parse the table printed by `espeak-ng --voices`
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  bn              --/M      Bengali            inc/bn
/// ```
#[must_use]
pub fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let language = columns.next()?;
            let _gender = columns.next()?;
            let name = columns.next()?;
            Some(Voice {
                name: name.to_string(),
                language: language.to_string(),
            })
        })
        .collect()
}
