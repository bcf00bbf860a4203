//! Minimal Bot API client: long-poll updates, send replies, download voice
//! files.
//!
//! Only the four methods the event loop needs are wrapped; each call maps
//! HTTP/`ok:false` failures into [`TelegramError`] and decodes just the
//! fields in [`crate::telegram::types`].

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::config::TelegramConfig;
use crate::session::Reply;
use crate::telegram::keyboards::markup;
use crate::telegram::types::{FileInfo, Update};

// ---------------------------------------------------------------------------
// TelegramError
// ---------------------------------------------------------------------------

/// Failures from the Bot API surface.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Transport-level failure.
    #[error("telegram request failed: {0}")]
    Http(String),

    /// The API answered with `ok: false`.
    #[error("telegram API error: {0}")]
    Api(String),

    /// The response body did not have the expected shape.
    #[error("unexpected telegram response: {0}")]
    Decode(String),

    /// A file download could not be completed.
    #[error("telegram file download failed: {0}")]
    Download(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        TelegramError::Http(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// BotApi
// ---------------------------------------------------------------------------

/// Bot API client bound to one bot token.
pub struct BotApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
    poll_timeout_secs: u64,
}

impl BotApi {
    /// Build the client from application config.
    ///
    /// No global request timeout is set — the long poll holds the
    /// connection open for `poll_timeout_secs`; individual calls attach
    /// their own deadline.
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            poll_timeout_secs: config.poll_timeout_secs,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_url, self.token)
    }

    /// Decode a Bot API envelope: `{ok, result, description?}`.
    fn unwrap_envelope(value: serde_json::Value) -> Result<serde_json::Value, TelegramError> {
        if value["ok"].as_bool() != Some(true) {
            let description = value["description"].as_str().unwrap_or("unknown error");
            return Err(TelegramError::Api(description.to_string()));
        }
        Ok(value["result"].clone())
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout_secs.to_string()),
            ])
            .timeout(Duration::from_secs(self.poll_timeout_secs + 10))
            .send()
            .await?;

        let value: serde_json::Value = response.json().await?;
        let result = Self::unwrap_envelope(value)?;
        serde_json::from_value(result).map_err(|e| TelegramError::Decode(e.to_string()))
    }

    /// Send one reply to `chat_id`, with its keyboard and parse mode.
    pub async fn send_message(
        &self,
        chat_id: i64,
        reply: &Reply,
    ) -> Result<(), TelegramError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": reply.text,
        });
        if reply.html {
            body["parse_mode"] = serde_json::Value::from("HTML");
        }
        if let Some(keyboard) = reply.keyboard {
            body["reply_markup"] = markup(keyboard);
        }

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let value: serde_json::Value = response.json().await?;
        Self::unwrap_envelope(value)?;
        Ok(())
    }

    /// Resolve a `file_id` into a downloadable path.
    async fn get_file(&self, file_id: &str) -> Result<FileInfo, TelegramError> {
        let response = self
            .client
            .get(self.method_url("getFile"))
            .query(&[("file_id", file_id)])
            .timeout(Duration::from_secs(15))
            .send()
            .await?;

        let value: serde_json::Value = response.json().await?;
        let result = Self::unwrap_envelope(value)?;
        serde_json::from_value(result).map_err(|e| TelegramError::Decode(e.to_string()))
    }

    /// Download the voice file behind `file_id` into `dest`.
    pub async fn download_file(
        &self,
        file_id: &str,
        dest: &Path,
    ) -> Result<(), TelegramError> {
        let info = self.get_file(file_id).await?;
        let Some(file_path) = info.file_path else {
            return Err(TelegramError::Download(format!(
                "no path for {}",
                info.file_id
            )));
        };

        let url = format!("{}/file/bot{}/{file_path}", self.api_url, self.token);
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TelegramError::Download(format!(
                "HTTP {} for {file_id}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|e| TelegramError::Download(format!("{}: {e}", dest.display())))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
