//! Cloud speech-to-text backend with multi-language detection.
//!
//! Sends the whole WAV as a base64 payload together with the channel count
//! read from the file header, asking for the primary locale plus the fixed
//! alternatives. Each response segment carries the locale the service used;
//! the majority vote across segments becomes the detected language and the
//! segment transcripts are joined with periods.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;

use crate::audio::wav_channel_count;
use crate::config::SpeechConfig;
use crate::recognize::gateway::RecognizeError;
use crate::recognize::language::Language;

// ---------------------------------------------------------------------------
// SpeechToTextApi
// ---------------------------------------------------------------------------

/// Client for the cloud `speech:recognize` endpoint.
pub struct SpeechToTextApi {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl SpeechToTextApi {
    /// Build the client from application config.
    pub fn from_config(config: &SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.speech_to_text_url.clone(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Transcribe `audio`, detecting the language per segment.
    ///
    /// Returns the majority-vote locale and the period-joined transcript.
    /// An empty transcript is a valid "no speech" outcome.
    pub async fn recognize(
        &self,
        audio: &Path,
    ) -> Result<(Language, String), RecognizeError> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|e| RecognizeError::FileAccess(format!("{}: {e}", audio.display())))?;

        let channels = wav_channel_count(audio).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                RecognizeError::FileAccess(format!("{}: {e}", audio.display()))
            }
            _ => RecognizeError::Backend(format!("{}: {e}", audio.display())),
        })?;

        let primary = Language::EnUs;
        let alternatives: Vec<&str> = Language::ALL
            .into_iter()
            .filter(|lang| *lang != primary)
            .map(Language::code)
            .collect();

        let body = serde_json::json!({
            "config": {
                "audioChannelCount":          channels,
                "enableAutomaticPunctuation": true,
                "languageCode":               primary.code(),
                "alternativeLanguageCodes":   alternatives,
            },
            "audio": {
                "content": base64::engine::general_purpose::STANDARD.encode(&bytes),
            },
        });

        let url = format!("{}/v1p1beta1/speech:recognize", self.base_url);
        let mut req = self.client.post(&url).json(&body);

        // Bearer token wins over an API key; with neither, the backend's
        // 401/403 surfaces as AccessDenied and triggers the manual fallback.
        if let Some(token) = self.access_token.as_deref() {
            req = req.bearer_auth(token);
        } else if let Some(key) = self.api_key.as_deref() {
            req = req.query(&[("key", key)]);
        }

        let response = req
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

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecognizeError::Backend(e.to_string()))?;

        Ok(parse_response(&json))
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Tally per-segment locales and join segment transcripts with periods.
///
/// The service reports locale codes in lowercase (`en-us`); parsing is
/// case-insensitive. Segments in an unrecognised locale still contribute
/// their text but not a vote. No segments at all — empty transcript,
/// primary locale.
pub(crate) fn parse_response(json: &serde_json::Value) -> (Language, String) {
    let mut tally: HashMap<Language, usize> = HashMap::new();
    let mut transcript = String::new();

    if let Some(results) = json["results"].as_array() {
        for result in results {
            if let Some(lang) = result["languageCode"]
                .as_str()
                .and_then(Language::from_code)
            {
                *tally.entry(lang).or_insert(0) += 1;
            }
            if let Some(text) = result["alternatives"][0]["transcript"].as_str() {
                transcript.push_str(text);
                transcript.push('.');
            }
        }
    }

    (majority_language(&tally), transcript)
}

/// The locale used by most segments; ties resolve in [`Language::ALL`]
/// order, so an empty tally falls back to the primary locale.
pub(crate) fn majority_language(tally: &HashMap<Language, usize>) -> Language {
    let mut best = Language::ALL[0];
    let mut best_count = tally.get(&best).copied().unwrap_or(0);

    for lang in Language::ALL {
        let count = tally.get(&lang).copied().unwrap_or(0);
        if count > best_count {
            best = lang;
            best_count = count;
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_join_with_periods_and_majority_wins() {
        let json = serde_json::json!({
            "results": [
                { "languageCode": "en-us",
                  "alternatives": [{ "transcript": "Hello world" }] },
                { "languageCode": "en-us",
                  "alternatives": [{ "transcript": "How are you" }] },
                { "languageCode": "uk-ua",
                  "alternatives": [{ "transcript": "привіт" }] },
            ]
        });

        let (language, transcript) = parse_response(&json);
        assert_eq!(language, Language::EnUs);
        assert_eq!(transcript, "Hello world.How are you.привіт.");
    }

    #[test]
    fn single_segment_detection() {
        let json = serde_json::json!({
            "results": [
                { "languageCode": "uk-ua",
                  "alternatives": [{ "transcript": "привіт" }] },
            ]
        });

        let (language, transcript) = parse_response(&json);
        assert_eq!(language, Language::UkUa);
        assert_eq!(transcript, "привіт.");
    }

    #[test]
    fn no_results_means_no_speech() {
        let (language, transcript) = parse_response(&serde_json::json!({}));
        assert_eq!(language, Language::EnUs);
        assert_eq!(transcript, "");
    }

    #[test]
    fn ties_resolve_in_declared_order() {
        let mut tally = HashMap::new();
        tally.insert(Language::UkUa, 1);
        tally.insert(Language::RuRu, 1);
        // en-US has zero votes; uk-UA precedes ru-RU in Language::ALL.
        assert_eq!(majority_language(&tally), Language::UkUa);
    }

    #[test]
    fn empty_tally_falls_back_to_primary() {
        assert_eq!(majority_language(&HashMap::new()), Language::EnUs);
    }

    #[test]
    fn from_config_builds_without_panic() {
        let config = SpeechConfig::default();
        let _api = SpeechToTextApi::from_config(&config);
    }
}
