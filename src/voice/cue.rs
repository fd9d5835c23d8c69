//! Audible error cue played after an incorrect attempt

use super::playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE};

/// Tone frequency in Hz
const TONE_FREQUENCY: f32 = 150.0;

/// Starting gain of the tone
const TONE_GAIN: f32 = 0.5;

/// Gain the envelope decays to at the end of the tone
const TONE_FLOOR: f32 = 0.0001;

/// Tone length in seconds
const TONE_SECONDS: f32 = 0.5;

/// Short non-speech sound signalling a wrong answer
pub trait ErrorCue: Send + Sync {
    /// Trigger the cue without waiting for it to finish
    fn play(&self);
}

/// Plays a decaying low sine tone on the default output device
#[derive(Debug, Default, Clone, Copy)]
pub struct ToneCue;

impl ErrorCue for ToneCue {
    fn play(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no runtime available for error cue");
            return;
        };

        runtime.spawn_blocking(|| {
            let samples = error_tone_samples(PLAYBACK_SAMPLE_RATE);
            let result = AudioPlayback::new().and_then(|playback| playback.play_blocking(samples));
            if let Err(e) = result {
                tracing::error!(error = %e, "could not play error sound");
            }
        });
    }
}

/// Samples for the error tone: a sine wave with an exponential decay
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn error_tone_samples(sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let count = (rate * TONE_SECONDS) as usize;
    let decay = (TONE_FLOOR / TONE_GAIN).ln() / TONE_SECONDS;

    (0..count)
        .map(|i| {
            let t = i as f32 / rate;
            let gain = TONE_GAIN * (decay * t).exp();
            gain * (2.0 * std::f32::consts::PI * TONE_FREQUENCY * t).sin()
        })
        .collect()
}
