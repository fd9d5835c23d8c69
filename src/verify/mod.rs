//! Pronunciation verification
//!
//! A verifier answers one question: does this recording sound like the
//! expected text? Failures of any kind resolve to `false`.

mod gemini;

use async_trait::async_trait;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, GeminiVerifier};

use crate::voice::AudioPayload;

/// Answer prefix counted as a positive verdict
const AFFIRMATIVE: &str = "yes";

/// Checks a recording against the text the learner was asked to say
#[async_trait]
pub trait PronunciationVerifier: Send + Sync {
    /// Returns true if the audio is a correct pronunciation of `expected`
    async fn verify(&self, audio: &AudioPayload, expected: &str) -> bool;
}

/// Whether a free-text answer starts with "yes", ignoring case and padding
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim()
        .get(..AFFIRMATIVE.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(AFFIRMATIVE))
}

/// Instruction sent alongside the recording
#[must_use]
pub fn prompt_for(expected: &str) -> String {
    format!(
        "The user is trying to pronounce the character or word \"{expected}\". \
         Does the provided audio sound like a correct pronunciation of it? \
         Please provide a simple \"yes\" or \"no\" answer."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        assert!(is_affirmative("Yes, that's right"));
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("  YES.\n"));
        assert!(is_affirmative("Yesss"));
    }

    #[test]
    fn test_negative_answers() {
        assert!(!is_affirmative("No"));
        assert!(!is_affirmative("maybe"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("ye"));
        assert!(!is_affirmative("I think yes"));
        assert!(!is_affirmative("হ্যাঁ"));
    }

    #[test]
    fn test_prompt_embeds_expected_text() {
        let prompt = prompt_for("অ");
        assert!(prompt.contains("\"অ\""));
        assert!(prompt.contains("\"yes\" or \"no\""));
    }
}
