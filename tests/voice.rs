//! Voice adapter integration tests
//!
//! Tests voice components without requiring audio hardware

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use lipi::voice::{
    PLAYBACK_SAMPLE_RATE, SpeechEngine, SpeechOutput, Speaker, Utterance, Voice,
    error_tone_samples, rms, samples_to_wav,
};
use lipi::{Notice, Result};

mod common;

use common::CollectingNotifier;

const SAMPLE_RATE: u32 = 16000;

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

// =============================================================================
// WAV encoding
// =============================================================================

#[test]
fn test_samples_to_wav_valid_header() {
    let samples = generate_sine_samples(440.0, 0.1, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
}

#[test]
fn test_samples_to_wav_readable() {
    let samples = generate_sine_samples(440.0, 0.5, 0.5);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, samples.len());
}

#[test]
fn test_samples_to_wav_clamps() {
    let samples = vec![2.0, -2.0, 0.0];
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(decoded[0], i16::MAX);
    assert!(decoded[1] <= -i16::MAX);
    assert_eq!(decoded[2], 0);
}

#[test]
fn test_rms_levels() {
    assert!(rms(&[]).abs() < f32::EPSILON);
    assert!(rms(&vec![0.0; 100]).abs() < f32::EPSILON);

    let loud = rms(&generate_sine_samples(440.0, 0.5, 0.8));
    let quiet = rms(&generate_sine_samples(440.0, 0.5, 0.1));
    assert!(loud > quiet);
}

// =============================================================================
// Error tone
// =============================================================================

#[test]
fn test_error_tone_shape() {
    let tone = error_tone_samples(PLAYBACK_SAMPLE_RATE);

    assert_eq!(tone.len(), PLAYBACK_SAMPLE_RATE as usize / 2);
    assert!(tone.iter().all(|s| s.abs() <= 0.5));

    let head = rms(&tone[..tone.len() / 10]);
    let tail = rms(&tone[tone.len() * 9 / 10..]);
    assert!(head > tail * 10.0, "tone should decay");
}

// =============================================================================
// Speech output
// =============================================================================

#[derive(Default)]
struct ScriptedEngine {
    voices: Vec<Voice>,
    events: Mutex<Vec<String>>,
    utterances: Mutex<Vec<Utterance>>,
}

impl SpeechEngine for ScriptedEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn cancel(&self) {
        self.events.lock().unwrap().push("cancel".to_string());
    }

    fn speak(&self, utterance: &Utterance) -> Result<()> {
        self.events.lock().unwrap().push(format!("speak {}", utterance.text));
        self.utterances.lock().unwrap().push(utterance.clone());
        Ok(())
    }
}

fn voice(name: &str, language: &str) -> Voice {
    Voice {
        name: name.to_string(),
        language: language.to_string(),
    }
}

#[test]
fn test_speaker_cancels_before_speaking() {
    let engine = Arc::new(ScriptedEngine::default());
    let notifier = Arc::new(CollectingNotifier::default());
    let speaker = Speaker::new(
        Some(engine.clone() as Arc<dyn SpeechEngine>),
        notifier.clone(),
        0.9,
    );

    speaker.speak("A", "en-US");
    speaker.speak("Apple", "en-US");

    assert_eq!(
        *engine.events.lock().unwrap(),
        vec!["cancel", "speak A", "cancel", "speak Apple"]
    );
    assert!(notifier.notices().is_empty());
}

#[test]
fn test_speaker_picks_matching_voice() {
    let engine = Arc::new(ScriptedEngine {
        voices: vec![voice("English", "en-gb"), voice("Bengali", "bn_BD")],
        ..ScriptedEngine::default()
    });
    let speaker = Speaker::new(
        Some(engine.clone() as Arc<dyn SpeechEngine>),
        Arc::new(CollectingNotifier::default()),
        0.9,
    );

    speaker.speak("ক", "bn-BD");
    speaker.speak("A", "en-US");

    let utterances = engine.utterances.lock().unwrap();
    assert_eq!(utterances[0].voice, Some(voice("Bengali", "bn_BD")));
    assert_eq!(utterances[0].language, "bn-BD");
    assert!((utterances[0].rate - 0.9).abs() < f32::EPSILON);

    // No en-US voice: platform default
    assert_eq!(utterances[1].voice, None);
    assert_eq!(utterances[1].language, "en-US");
}

#[test]
fn test_speaker_falls_back_to_primary_language_voice() {
    // espeak lists Bengali under the bare "bn" tag
    let engine = Arc::new(ScriptedEngine {
        voices: vec![voice("English_(America)", "en-us"), voice("Bengali", "bn")],
        ..ScriptedEngine::default()
    });
    let speaker = Speaker::new(
        Some(engine.clone() as Arc<dyn SpeechEngine>),
        Arc::new(CollectingNotifier::default()),
        0.9,
    );

    speaker.speak("অ", "bn-BD");

    let utterances = engine.utterances.lock().unwrap();
    assert_eq!(utterances[0].voice, Some(voice("Bengali", "bn")));
}

#[test]
fn test_speaker_without_engine_notifies() {
    let notifier = Arc::new(CollectingNotifier::default());
    let speaker = Speaker::new(None, notifier.clone(), 0.9);
    assert!(!speaker.is_supported());

    speaker.speak("A", "en-US");

    assert_eq!(notifier.notices(), vec![Notice::SpeechUnsupported]);
}
