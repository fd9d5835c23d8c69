//! Gemini-backed pronunciation verifier
//!
//! Sends the recording inline (base64) together with a yes/no instruction to
//! the `generateContent` endpoint and reads the leading word of the answer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{PronunciationVerifier, is_affirmative, prompt_for};
use crate::config::VerifierConfig;
use crate::notice::{Notice, Notifier, WarnOnce};
use crate::voice::AudioPayload;
use crate::{Error, Result};

/// Default Gemini API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for classification
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `generateContent` request
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

/// Request part (inline audio or text)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    InlineData(InlineData<'a>),
    Text(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

/// `generateContent` response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Pronunciation verifier using Gemini audio understanding
pub struct GeminiVerifier {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
    notifier: Arc<dyn Notifier>,
    missing_key: WarnOnce,
}

impl GeminiVerifier {
    /// Create a verifier from configuration
    ///
    /// A missing or blank key is accepted; every verdict is then negative.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(
        config: &VerifierConfig,
        api_key: Option<SecretString>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Self::build(
            api_key,
            notifier,
            config.model.clone(),
            config.base_url.clone(),
            config.timeout,
        )
    }

    fn build(
        api_key: Option<SecretString>,
        notifier: Arc<dyn Notifier>,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.expose_secret().trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY not set, pronunciation checks will always fail");
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            notifier,
            missing_key: WarnOnce::new(),
        })
    }

    /// Whether a credential is configured
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Ask the model for a verdict and return its raw answer
    async fn ask(&self, api_key: &str, audio: &AudioPayload, expected: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData(InlineData {
                        mime_type: &audio.mime_type,
                        data: base64::engine::general_purpose::STANDARD.encode(&audio.data),
                    }),
                    Part::Text(prompt_for(expected)),
                ],
            }],
        };

        tracing::debug!(
            model = %self.model,
            audio_bytes = audio.len(),
            mime_type = %audio.mime_type,
            expected,
            "requesting pronunciation verdict"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Verification(format!("API error {status}: {body}")));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Verification(format!("parse error: {e}")))?;

        let answer = result.text();
        if answer.trim().is_empty() {
            return Err(Error::Verification("empty response".to_string()));
        }
        Ok(answer)
    }
}

#[async_trait]
impl PronunciationVerifier for GeminiVerifier {
    async fn verify(&self, audio: &AudioPayload, expected: &str) -> bool {
        let Some(api_key) = &self.api_key else {
            if self.missing_key.first() {
                self.notifier.notify(Notice::MissingCredential);
            }
            return false;
        };

        match self.ask(api_key.expose_secret(), audio, expected).await {
            Ok(answer) => {
                let verdict = is_affirmative(&answer);
                tracing::info!(expected, answer = %answer.trim(), verdict, "pronunciation checked");
                verdict
            }
            Err(e) => {
                tracing::error!(error = %e, "error verifying pronunciation");
                self.notifier.notify(Notice::VerificationFailed);
                false
            }
        }
    }
}

impl std::fmt::Debug for GeminiVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiVerifier")
            .field("configured", &self.api_key.is_some())
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
