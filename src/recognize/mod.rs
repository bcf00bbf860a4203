//! Speech-recognition gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │             RecognitionGateway (trait)                  │
//! │                                                        │
//! │        SpeechRecognizer (tagged union)                 │
//! │        ├─ Dictation(DictationApi)                      │
//! │        │    recognize(wav, language) → transcript      │
//! │        └─ AutoDetect(SpeechToTextApi)                  │
//! │             recognize(wav) → (locale, transcript)      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly two strategies exist; [`SpeechRecognizer`] is an enum rather
//! than a class hierarchy, selected by [`RecognizerKind`] at the point of
//! use. An empty transcript is a valid "no speech" outcome on either
//! strategy, distinct from a backend failure.

pub mod dictation;
pub mod gateway;
pub mod language;
pub mod speech_to_text;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use dictation::DictationApi;
pub use gateway::{
    RecognitionGateway, Recognized, RecognizeError, RecognizerKind, SpeechRecognizer,
};
pub use language::Language;
pub use speech_to_text::SpeechToTextApi;

// test-only re-export so the conversation tests can import the mock without
// the full gateway path.
#[cfg(test)]
pub use gateway::MockRecognizer;
