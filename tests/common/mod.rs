//! Shared test utilities: in-memory adapters for card tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use lipi::voice::{AudioPayload, CaptureStream, ErrorCue, Microphone, SpeechOutput};
use lipi::{
    CardController, CardPorts, CardTiming, Category, Error, LearningItem, Notice, Notifier,
    PronunciationVerifier, Result,
};

/// Let spawned tasks run without advancing the clock
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Build a test item
pub const fn item(character: &'static str, word: Option<&'static str>) -> LearningItem {
    LearningItem {
        character,
        word,
        english_pronunciation: None,
        image: "images/test.png",
    }
}

/// One call to the speech adapter
#[derive(Debug, Clone)]
pub struct SpokenText {
    pub text: String,
    pub language: String,
    pub at: Instant,
}

/// Speech output that records every call
#[derive(Default)]
pub struct RecordingSpeech {
    calls: Mutex<Vec<SpokenText>>,
}

impl RecordingSpeech {
    pub fn calls(&self) -> Vec<SpokenText> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .map(|c| (c.text, c.language))
            .collect()
    }
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str, language: &str) {
        self.calls.lock().unwrap().push(SpokenText {
            text: text.to_string(),
            language: language.to_string(),
            at: Instant::now(),
        });
    }
}

/// How the fake microphone behaves
#[derive(Clone)]
enum MicBehavior {
    Audio(Vec<Vec<u8>>),
    Denied,
    StopFails,
}

/// Microphone that hands out scripted capture streams
pub struct FakeMicrophone {
    behavior: MicBehavior,
    gate: Option<Arc<Notify>>,
    opens: AtomicUsize,
    stops: Arc<AtomicUsize>,
}

impl FakeMicrophone {
    fn with(behavior: MicBehavior) -> Self {
        Self {
            behavior,
            gate: None,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Streams that yield these chunks when stopped
    pub fn with_audio(chunks: Vec<Vec<u8>>) -> Self {
        Self::with(MicBehavior::Audio(chunks))
    }

    /// Streams that capture nothing
    pub fn silent() -> Self {
        Self::with(MicBehavior::Audio(Vec::new()))
    }

    /// Access is always refused
    pub fn denied() -> Self {
        Self::with(MicBehavior::Denied)
    }

    /// Streams whose stop reports a device failure
    pub fn failing_stop() -> Self {
        Self::with(MicBehavior::StopFails)
    }

    /// Hold every open until the gate is notified
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Microphone for FakeMicrophone {
    async fn open(&self) -> Result<Box<dyn CaptureStream>> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.opens.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MicBehavior::Denied => Err(Error::PermissionDenied("access refused".to_string())),
            MicBehavior::Audio(chunks) => Ok(Box::new(FakeStream {
                chunks: chunks.clone(),
                fail: false,
                stops: Arc::clone(&self.stops),
            })),
            MicBehavior::StopFails => Ok(Box::new(FakeStream {
                chunks: Vec::new(),
                fail: true,
                stops: Arc::clone(&self.stops),
            })),
        }
    }
}

struct FakeStream {
    chunks: Vec<Vec<u8>>,
    fail: bool,
    stops: Arc<AtomicUsize>,
}

impl CaptureStream for FakeStream {
    fn mime_type(&self) -> &str {
        "audio/webm"
    }

    fn stop(&mut self) -> Result<Vec<Vec<u8>>> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Device("recorder crashed".to_string()));
        }
        Ok(std::mem::take(&mut self.chunks))
    }
}

/// Verifier returning a fixed verdict and recording its inputs
pub struct FakeVerifier {
    verdict: bool,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<(AudioPayload, String)>>,
}

impl FakeVerifier {
    pub fn answering(verdict: bool) -> Self {
        Self {
            verdict,
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold every verdict until the gate is notified
    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<(AudioPayload, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PronunciationVerifier for FakeVerifier {
    async fn verify(&self, audio: &AudioPayload, expected: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push((audio.clone(), expected.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.verdict
    }
}

/// Error cue that counts plays
#[derive(Default)]
pub struct CountingCue {
    plays: AtomicUsize,
}

impl CountingCue {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl ErrorCue for CountingCue {
    fn play(&self) {
        self.plays.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notifier that collects notices
#[derive(Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// A full set of fakes wired into card ports
pub struct Harness {
    pub speech: Arc<RecordingSpeech>,
    pub mic: Arc<FakeMicrophone>,
    pub verifier: Arc<FakeVerifier>,
    pub cue: Arc<CountingCue>,
    pub notifier: Arc<CollectingNotifier>,
}

impl Harness {
    pub fn new(mic: FakeMicrophone, verifier: FakeVerifier) -> Self {
        Self {
            speech: Arc::new(RecordingSpeech::default()),
            mic: Arc::new(mic),
            verifier: Arc::new(verifier),
            cue: Arc::new(CountingCue::default()),
            notifier: Arc::new(CollectingNotifier::default()),
        }
    }

    pub fn ports(&self) -> CardPorts {
        CardPorts {
            speech: self.speech.clone(),
            microphone: self.mic.clone(),
            verifier: self.verifier.clone(),
            cue: self.cue.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn card(&self, item: LearningItem, category: Category) -> CardController {
        CardController::new(item, category, self.ports(), CardTiming::default())
    }
}
