//! Voice module
//!
//! Platform adapters for microphone capture, speaker playback, the error
//! tone, and text-to-speech.

mod capture;
mod cue;
mod playback;
mod session;
mod speech;

pub use capture::{
    CpalCapture, CpalMicrophone, InputDeviceInfo, WAV_MIME_TYPE, rms, samples_to_wav,
};
pub use cue::{ErrorCue, ToneCue, error_tone_samples};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE};
pub use session::{
    AudioPayload, CaptureStream, DEFAULT_MIME_TYPE, Microphone, RecordingSession,
};
pub use speech::{
    DEFAULT_RATE, EspeakEngine, SpeechEngine, SpeechOutput, Speaker, Utterance, Voice,
    parse_voice_list, select_voice,
};
