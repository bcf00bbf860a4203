//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across
//! threads. Secrets (bot token, store auth, speech credentials) can be
//! supplied through environment variables instead of the settings file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::recognize::RecognizerKind;

use super::AppPaths;

// ---------------------------------------------------------------------------
// StorageBackend
// ---------------------------------------------------------------------------

/// Selects which entry-store backend serves this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Firebase Realtime Database over REST.
    Firebase,
    /// Process-local map — nothing survives a restart. For local runs.
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::Firebase
    }
}

// ---------------------------------------------------------------------------
// TelegramConfig
// ---------------------------------------------------------------------------

/// Chat-transport connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token. Usually supplied via `TELEGRAM_BOT_TOKEN` instead of the
    /// settings file.
    pub token: String,
    /// Bot API base URL.
    pub api_url: String,
    /// Long-poll window for `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.telegram.org".into(),
            poll_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// FirebaseConfig
// ---------------------------------------------------------------------------

/// Realtime Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseConfig {
    /// Database root URL (e.g. `https://<project>.firebaseio.com`).
    pub database_url: String,
    /// Auth token appended to every request — `None` for open rules or
    /// emulator runs.
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            auth_token: None,
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings shared by both recognition strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Which strategy serves the first (automatic) recognition attempt.
    pub auto_recognizer: RecognizerKind,
    /// Which strategy serves the manual-language fallback.
    pub manual_recognizer: RecognizerKind,
    /// Base URL of the web dictation endpoint.
    pub dictation_url: String,
    /// API key for the dictation endpoint.
    pub dictation_key: Option<String>,
    /// Base URL of the cloud speech-to-text endpoint.
    pub speech_to_text_url: String,
    /// API key for the speech-to-text endpoint.
    pub api_key: Option<String>,
    /// OAuth bearer token for the speech-to-text endpoint; wins over
    /// `api_key` when both are set.
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            auto_recognizer: RecognizerKind::SpeechToText,
            manual_recognizer: RecognizerKind::Dictation,
            dictation_url: "http://www.google.com".into(),
            dictation_key: None,
            speech_to_text_url: "https://speech.googleapis.com".into(),
            api_key: None,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Voice-file handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Work directory for in-flight voice files — `None` means the
    /// platform data directory.
    pub work_dir: Option<PathBuf>,
    /// Path or name of the `ffmpeg` binary.
    pub ffmpeg_path: String,
    /// Maximum seconds to wait for one conversion to finish.
    pub convert_timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            ffmpeg_path: "ffmpeg".into(),
            convert_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// BotConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_journal::config::BotConfig;
///
/// // Load (returns Default when file is missing), then let the
/// // environment override the secrets.
/// let mut config = BotConfig::load().unwrap();
/// config.apply_env();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotConfig {
    /// Which entry-store backend to use.
    pub storage: StorageBackend,
    /// Chat transport settings.
    pub telegram: TelegramConfig,
    /// Realtime Database settings.
    pub firebase: FirebaseConfig,
    /// Recognition backend settings.
    pub speech: SpeechConfig,
    /// Voice-file handling settings.
    pub audio: AudioConfig,
}

impl BotConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(BotConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Let the process environment override the stored secrets.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    fn apply_env_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("TELEGRAM_BOT_TOKEN") {
            self.telegram.token = token;
        }
        if let Some(url) = var("FIREBASE_DATABASE_URL") {
            self.firebase.database_url = url;
        }
        if let Some(token) = var("FIREBASE_AUTH_TOKEN") {
            self.firebase.auth_token = Some(token);
        }
        if let Some(key) = var("SPEECH_API_KEY") {
            self.speech.api_key = Some(key);
        }
        if let Some(token) = var("SPEECH_ACCESS_TOKEN") {
            self.speech.access_token = Some(token);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
