//! Card interaction controller
//!
//! One [`CardController`] drives one visible flashcard: reference playback,
//! press-to-record, verification, and the timed verdict display. Cards share
//! adapters but no state, so any number can run side by side.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub use state::{CardMachine, CardState, Verdict};

use crate::catalog::{Category, LearningItem};
use crate::notice::{Notice, Notifier};
use crate::verify::PronunciationVerifier;
use crate::voice::{AudioPayload, ErrorCue, Microphone, RecordingSession, SpeechOutput};
use crate::Error;

/// Timing constants for card interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTiming {
    /// How long a verdict stays on display
    pub result_display: Duration,

    /// Gap between character and word for English items
    pub english_word_delay: Duration,

    /// Gap between character and word for Bangla items
    pub bangla_word_delay: Duration,
}

impl Default for CardTiming {
    fn default() -> Self {
        Self {
            result_display: Duration::from_millis(2500),
            english_word_delay: Duration::from_millis(500),
            bangla_word_delay: Duration::from_millis(700),
        }
    }
}

impl CardTiming {
    /// Delay before the example word is spoken
    #[must_use]
    pub const fn word_delay(&self, category: Category) -> Duration {
        if category.is_english() {
            self.english_word_delay
        } else {
            self.bangla_word_delay
        }
    }
}

/// Adapters a card talks to
#[derive(Clone)]
pub struct CardPorts {
    /// Reference speech
    pub speech: Arc<dyn SpeechOutput>,
    /// Microphone
    pub microphone: Arc<dyn Microphone>,
    /// Pronunciation verifier
    pub verifier: Arc<dyn PronunciationVerifier>,
    /// Sound played after an incorrect attempt
    pub cue: Arc<dyn ErrorCue>,
    /// User-facing notices
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for CardPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardPorts").finish_non_exhaustive()
    }
}

struct CardInner {
    machine: CardMachine,
    session: Option<RecordingSession>,
    opening: bool,
    stop_requested: bool,
    torn_down: bool,
    pending_word: Option<JoinHandle<()>>,
    reset_timer: Option<JoinHandle<()>>,
    state_tx: watch::Sender<CardState>,
}

impl CardInner {
    fn publish(&self) {
        self.state_tx.send_replace(self.machine.state());
    }
}

fn lock(inner: &Mutex<CardInner>) -> MutexGuard<'_, CardInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drives one flashcard through its interaction cycle
///
/// Must be used from within a Tokio runtime; delayed speech, verification
/// and result expiry run as spawned tasks. Dropping the controller tears it
/// down.
pub struct CardController {
    item: LearningItem,
    category: Category,
    ports: CardPorts,
    timing: CardTiming,
    inner: Arc<Mutex<CardInner>>,
}

impl CardController {
    /// Create a controller for one item
    #[must_use]
    pub fn new(
        item: LearningItem,
        category: Category,
        ports: CardPorts,
        timing: CardTiming,
    ) -> Self {
        let (state_tx, _) = watch::channel(CardState::Idle);
        Self {
            item,
            category,
            ports,
            timing,
            inner: Arc::new(Mutex::new(CardInner {
                machine: CardMachine::new(),
                session: None,
                opening: false,
                stop_requested: false,
                torn_down: false,
                pending_word: None,
                reset_timer: None,
                state_tx,
            })),
        }
    }

    /// The item on this card
    #[must_use]
    pub const fn item(&self) -> &LearningItem {
        &self.item
    }

    /// The category this card belongs to
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> CardState {
        lock(&self.inner).machine.state()
    }

    /// Watch state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CardState> {
        lock(&self.inner).state_tx.subscribe()
    }

    /// Speak the character, then the example word after a short gap
    ///
    /// Ignored while recording or verifying. Returns whether playback started.
    pub fn play_reference(&self) -> bool {
        let mut inner = lock(&self.inner);
        if inner.torn_down || !inner.machine.can_play() {
            tracing::debug!(state = ?inner.machine.state(), "reference playback ignored");
            return false;
        }

        let language = self.category.language_tag();
        self.ports.speech.speak(self.item.character, language);

        if let Some(word) = self.item.word {
            let delay = self.timing.word_delay(self.category);
            let speech = Arc::clone(&self.ports.speech);
            if let Some(previous) = inner.pending_word.take() {
                previous.abort();
            }
            inner.pending_word = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                speech.speak(word, language);
            }));
        }

        true
    }

    /// Open the microphone and start recording
    ///
    /// Ignored while recording or verifying. Returns whether a recording
    /// session was opened.
    pub async fn begin_recording(&self) -> bool {
        {
            let mut inner = lock(&self.inner);
            if inner.torn_down || !inner.machine.begin_recording() {
                tracing::debug!(state = ?inner.machine.state(), "recording request ignored");
                return false;
            }
            // The delayed example word must not land in the recording
            if let Some(word) = inner.pending_word.take() {
                word.abort();
            }
            inner.opening = true;
            inner.stop_requested = false;
            inner.publish();
        }

        let mut pending = PendingOpen {
            inner: &self.inner,
            armed: true,
        };
        let opened = RecordingSession::open(self.ports.microphone.as_ref()).await;
        pending.armed = false;

        let mut inner = lock(&self.inner);
        inner.opening = false;

        let session = match opened {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "error starting recording");
                if inner.machine.abort_recording() {
                    inner.publish();
                }
                drop(inner);
                let notice = match e {
                    Error::PermissionDenied(_) => Notice::MicrophoneUnavailable,
                    _ => Notice::DeviceFailure,
                };
                self.ports.notifier.notify(notice);
                return false;
            }
        };

        if inner.torn_down {
            drop(inner);
            drop(session);
            return false;
        }

        if std::mem::take(&mut inner.stop_requested) {
            tracing::debug!("stop requested while microphone was opening");
            self.finish_recording(&mut inner, session);
        } else {
            tracing::debug!(character = self.item.character, "recording started");
            inner.session = Some(session);
        }
        true
    }

    /// Stop recording and submit the audio for verification
    ///
    /// The microphone is released before verification starts. An empty
    /// recording returns the card to `Idle` without a verification call.
    /// Returns whether a recording was stopped.
    pub fn end_recording(&self) -> bool {
        let mut inner = lock(&self.inner);
        if inner.torn_down || inner.machine.state() != CardState::Recording {
            return false;
        }

        match inner.session.take() {
            Some(session) => self.finish_recording(&mut inner, session),
            None if inner.opening => inner.stop_requested = true,
            None => {
                if inner.machine.abort_recording() {
                    inner.publish();
                }
            }
        }
        true
    }

    /// The pointer left the record control; same as releasing it
    pub fn pointer_left(&self) -> bool {
        self.end_recording()
    }

    /// Tear the card down
    ///
    /// Releases any open microphone, cancels pending speech and the result
    /// timer, and makes any in-flight verdict a no-op.
    pub fn teardown(&self) {
        let session = {
            let mut inner = lock(&self.inner);
            if inner.torn_down {
                return;
            }
            inner.torn_down = true;
            if let Some(timer) = inner.reset_timer.take() {
                timer.abort();
            }
            if let Some(word) = inner.pending_word.take() {
                word.abort();
            }
            inner.session.take()
        };

        if session.is_some() {
            tracing::debug!("releasing microphone on teardown");
        }
        drop(session);
    }

    fn finish_recording(&self, inner: &mut CardInner, session: RecordingSession) {
        match session.close() {
            Ok(Some(payload)) => {
                if inner.machine.submit() {
                    inner.publish();
                    self.spawn_verification(payload);
                }
            }
            Ok(None) => {
                tracing::debug!("no audio captured, skipping verification");
                if inner.machine.abort_recording() {
                    inner.publish();
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "error stopping recording");
                if inner.machine.abort_recording() {
                    inner.publish();
                }
                self.ports.notifier.notify(Notice::DeviceFailure);
            }
        }
    }

    fn spawn_verification(&self, payload: AudioPayload) {
        let verifier = Arc::clone(&self.ports.verifier);
        let cue = Arc::clone(&self.ports.cue);
        let expected = self.item.expected_text(self.category);
        let display = self.timing.result_display;
        let inner = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            let correct = verifier.verify(&payload, expected).await;
            complete_verification(&inner, Verdict::from(correct), cue.as_ref(), display);
        });
    }
}

impl Drop for CardController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for CardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardController")
            .field("character", &self.item.character)
            .field("category", &self.category)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Returns the card to `Idle` if the open future is dropped mid-flight
struct PendingOpen<'a> {
    inner: &'a Mutex<CardInner>,
    armed: bool,
}

impl Drop for PendingOpen<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock(self.inner);
        inner.opening = false;
        inner.stop_requested = false;
        if inner.machine.abort_recording() {
            inner.publish();
        }
    }
}

fn complete_verification(
    inner: &Weak<Mutex<CardInner>>,
    verdict: Verdict,
    cue: &dyn ErrorCue,
    display: Duration,
) {
    let Some(inner) = inner.upgrade() else {
        tracing::debug!(?verdict, "card dropped, discarding verdict");
        return;
    };

    let mut guard = lock(&inner);
    if guard.torn_down {
        tracing::debug!(?verdict, "card torn down, discarding verdict");
        return;
    }
    let Some(epoch) = guard.machine.complete(verdict) else {
        return;
    };
    guard.publish();

    if verdict == Verdict::Incorrect {
        cue.play();
    }

    let weak = Arc::downgrade(&inner);
    let timer = tokio::spawn(async move {
        tokio::time::sleep(display).await;
        if let Some(inner) = weak.upgrade() {
            let mut guard = lock(&inner);
            if guard.machine.expire(epoch) {
                guard.publish();
            }
        }
    });
    if let Some(previous) = guard.reset_timer.replace(timer) {
        previous.abort();
    }
}
