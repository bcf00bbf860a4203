//! Recognition gateway trait and the two-strategy dispatcher.
//!
//! [`RecognitionGateway`] is the object-safe interface the conversation
//! layer calls. [`SpeechRecognizer`] is the production implementation: a
//! tagged union of exactly the two backends that exist, selected by a
//! runtime key. No open-ended hierarchy — adding a backend means adding a
//! variant.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::recognize::dictation::DictationApi;
use crate::recognize::language::Language;
use crate::recognize::speech_to_text::SpeechToTextApi;

// ---------------------------------------------------------------------------
// RecognizeError
// ---------------------------------------------------------------------------

/// Failures from the recognition backends.
///
/// A no-speech result is **not** an error — it comes back as an `Ok` value
/// with an empty transcript so callers can distinguish "nothing was said"
/// from "the backend is broken".
#[derive(Debug, Clone, Error)]
pub enum RecognizeError {
    /// Credentials were rejected or missing for the backend.
    #[error("recognition backend denied access: {0}")]
    AccessDenied(String),

    /// The audio file is missing or unreadable.
    #[error("cannot read audio file: {0}")]
    FileAccess(String),

    /// Transport failure or an unparsable response.
    #[error("recognition backend error: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// Recognized
// ---------------------------------------------------------------------------

/// Result of a recognition call, shaped by the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognized {
    /// Dictation strategy — the caller supplied the language.
    Transcript(String),

    /// Auto-detect strategy — majority-vote locale over the response
    /// segments plus the period-joined transcript.
    Detected {
        language: Language,
        transcript: String,
    },
}

impl Recognized {
    /// The transcript regardless of strategy.
    pub fn transcript(&self) -> &str {
        match self {
            Recognized::Transcript(text) => text,
            Recognized::Detected { transcript, .. } => transcript,
        }
    }
}

// ---------------------------------------------------------------------------
// RecognitionGateway trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface over a recognition strategy.
///
/// Implementations must be `Send + Sync` so they can be held behind an
/// `Arc<dyn RecognitionGateway>` by the conversation layer.
///
/// # Contract
///
/// * `audio` points at a 16-bit PCM WAV file produced by the converter.
/// * `hint` is required by the dictation strategy and ignored by the
///   auto-detect strategy.
/// * An empty transcript in the `Ok` value means "no speech detected".
#[async_trait]
pub trait RecognitionGateway: Send + Sync {
    async fn recognize(
        &self,
        audio: &Path,
        hint: Option<Language>,
    ) -> Result<Recognized, RecognizeError>;
}

// ---------------------------------------------------------------------------
// Strategy selection
// ---------------------------------------------------------------------------

/// Runtime key naming one of the two strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognizerKind {
    /// Web dictation API — caller supplies the language.
    Dictation,
    /// Cloud speech-to-text API with multi-language detection.
    SpeechToText,
}

/// The production recognition strategy — a tagged union of the two
/// backends that exist.
pub enum SpeechRecognizer {
    Dictation(DictationApi),
    AutoDetect(SpeechToTextApi),
}

impl SpeechRecognizer {
    /// Build the strategy named by `kind` from configuration.
    pub fn from_kind(kind: RecognizerKind, config: &crate::config::SpeechConfig) -> Self {
        match kind {
            RecognizerKind::Dictation => {
                SpeechRecognizer::Dictation(DictationApi::from_config(config))
            }
            RecognizerKind::SpeechToText => {
                SpeechRecognizer::AutoDetect(SpeechToTextApi::from_config(config))
            }
        }
    }
}

#[async_trait]
impl RecognitionGateway for SpeechRecognizer {
    async fn recognize(
        &self,
        audio: &Path,
        hint: Option<Language>,
    ) -> Result<Recognized, RecognizeError> {
        match self {
            SpeechRecognizer::Dictation(api) => {
                let language = hint.unwrap_or(Language::EnUs);
                let transcript = api.recognize(audio, language).await?;
                Ok(Recognized::Transcript(transcript))
            }
            SpeechRecognizer::AutoDetect(api) => {
                let (language, transcript) = api.recognize(audio).await?;
                Ok(Recognized::Detected {
                    language,
                    transcript,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network
/// or audio-file access.
#[cfg(test)]
pub struct MockRecognizer {
    response: Result<Recognized, RecognizeError>,
}

#[cfg(test)]
impl MockRecognizer {
    /// Auto-detect success with the given locale and transcript.
    pub fn detected(language: Language, transcript: impl Into<String>) -> Self {
        Self {
            response: Ok(Recognized::Detected {
                language,
                transcript: transcript.into(),
            }),
        }
    }

    /// Dictation success with the given transcript.
    pub fn transcript(text: impl Into<String>) -> Self {
        Self {
            response: Ok(Recognized::Transcript(text.into())),
        }
    }

    /// Always fails with `error`.
    pub fn err(error: RecognizeError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl RecognitionGateway for MockRecognizer {
    async fn recognize(
        &self,
        _audio: &Path,
        _hint: Option<Language>,
    ) -> Result<Recognized, RecognizeError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
