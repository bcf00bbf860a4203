//! Web dictation backend — transcribes with a caller-supplied language.
//!
//! Posts the converted WAV bytes to the dictation endpoint and takes the
//! first alternative of the first non-empty result. The endpoint streams
//! one JSON object per line; an empty-result body means no speech was
//! detected and comes back as an empty transcript, not an error.

use std::path::Path;

use crate::config::SpeechConfig;
use crate::recognize::gateway::RecognizeError;
use crate::recognize::language::Language;

// ---------------------------------------------------------------------------
// DictationApi
// ---------------------------------------------------------------------------

/// Client for the web dictation endpoint.
///
/// All connection details come from [`SpeechConfig`]; nothing is hardcoded.
pub struct DictationApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl DictationApi {
    /// Build the client from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the last-resort fallback
    /// if the builder fails.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.dictation_url.clone(),
            api_key: config.dictation_key.clone(),
        }
    }

    /// Transcribe `audio` as speech in `language`.
    ///
    /// Returns an empty string when the service detects no speech.
    pub async fn recognize(
        &self,
        audio: &Path,
        language: Language,
    ) -> Result<String, RecognizeError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| RecognizeError::FileAccess(format!("{}: {e}", audio.display())))?;

        let url = format!("{}/speech-api/v2/recognize", self.base_url);
        let mut query: Vec<(&str, &str)> =
            vec![("client", "chromium"), ("lang", language.code())];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }

        let response = self
            .client
            .post(&url)
            .query(&query)
            .header(reqwest::header::CONTENT_TYPE, "audio/l16; rate=16000")
            .body(bytes)
            .send()
            .await
            .map_err(|e| RecognizeError::Backend(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RecognizeError::AccessDenied(status.to_string()));
        }
        if !status.is_success() {
            return Err(RecognizeError::Backend(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RecognizeError::Backend(e.to_string()))?;

        Ok(parse_body(&body))
    }
}

/// Extract the transcript from the line-delimited JSON response body.
///
/// The endpoint emits an empty `{"result":[]}` line before the real result;
/// the first line carrying an alternative wins. No such line — no speech.
pub(crate) fn parse_body(body: &str) -> String {
    for line in body.lines() {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if let Some(transcript) = value["result"][0]["alternative"][0]["transcript"].as_str() {
            return transcript.to_string();
        }
    }
    String::new()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
