//! Lipi - flashcard pronunciation practice
//!
//! Learners see a card (a Bangla or English letter or numeral), hear a
//! reference pronunciation, record their own attempt, and get a
//! correct/incorrect verdict from a remote audio-classification service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Catalog / CLI view                   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ one per visible item
//! ┌────────────────────▼────────────────────────────────┐
//! │               Card Controller (FSM)                  │
//! │   Idle → Recording → Verifying → ShowingResult       │
//! └──────┬──────────────┬───────────────┬───────────────┘
//!        │              │               │
//! ┌──────▼─────┐ ┌──────▼──────┐ ┌──────▼──────────────┐
//! │  Speaker   │ │ Microphone  │ │ Pronunciation       │
//! │  (espeak)  │ │ (cpal)      │ │ Verifier (Gemini)   │
//! └────────────┘ └─────────────┘ └─────────────────────┘
//! ```

pub mod card;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notice;
pub mod verify;
pub mod voice;

pub use card::{CardController, CardMachine, CardPorts, CardState, CardTiming, Verdict};
pub use catalog::{Category, LearningItem};
pub use config::Config;
pub use error::{Error, Result};
pub use notice::{ConsoleNotifier, Notice, Notifier, WarnOnce};
pub use verify::{GeminiVerifier, PronunciationVerifier, is_affirmative};
