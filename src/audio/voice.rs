//! Voice-file naming, placement and the pipeline trait.
//!
//! Every in-flight capture owns exactly one pair of files in the work
//! directory, named after the user and the entry timestamp. The files live
//! only for the duration of the capture; [`VoiceAudio::discard`] removes
//! them once the entry is stored or the turn fails terminally.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Failures in the voice-file pipeline. All of them are terminal for the
/// current capture turn.
#[derive(Debug, Clone, Error)]
pub enum AudioError {
    /// Downloading the voice file from the chat transport failed.
    #[error("voice download failed: {0}")]
    Download(String),

    /// A required audio file is missing or unreadable.
    #[error("audio file unavailable: {0}")]
    FileAccess(String),

    /// The external converter failed.
    #[error("audio conversion failed: {0}")]
    Convert(String),

    /// The converter did not finish within the configured window.
    #[error("audio conversion timed out after {0}s")]
    Timeout(u64),
}

// ---------------------------------------------------------------------------
// File naming
// ---------------------------------------------------------------------------

/// File stem for one capture: `<user id>_<entry timestamp>`.
pub fn voice_stem(user_id: i64, timestamp: i64) -> String {
    format!("{user_id}_{timestamp}")
}

/// Resolves voice-file paths inside the work directory.
#[derive(Debug, Clone)]
pub struct VoiceFiles {
    work_dir: PathBuf,
}

impl VoiceFiles {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn ogg_path(&self, stem: &str) -> PathBuf {
        self.work_dir.join(format!("{stem}.ogg"))
    }

    pub fn wav_path(&self, stem: &str) -> PathBuf {
        self.work_dir.join(format!("{stem}.wav"))
    }

    /// Remove both files for `stem`; files that were never created are
    /// skipped silently.
    pub fn remove(&self, stem: &str) {
        for path in [self.ogg_path(stem), self.wav_path(stem)] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(&path) {
                    log::warn!("audio: failed to remove {}: {e}", path.display());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// VoiceAudio trait
// ---------------------------------------------------------------------------

/// The capture pipeline's view of voice-file handling.
///
/// Object-safe and `Send + Sync` so the conversation layer can hold it
/// behind an `Arc<dyn VoiceAudio>`; the production implementation downloads
/// via the chat transport and converts with `ffmpeg`.
#[async_trait]
pub trait VoiceAudio: Send + Sync {
    /// Download the raw voice file for `file_id` into the work directory
    /// under `stem`.
    async fn fetch(&self, file_id: &str, stem: &str) -> Result<(), AudioError>;

    /// Produce the WAV for `stem`, waiting for conversion to complete.
    async fn prepare_wav(&self, stem: &str) -> Result<PathBuf, AudioError>;

    /// Drop both files for `stem`. Never fails; missing files are fine.
    fn discard(&self, stem: &str);
}

// ---------------------------------------------------------------------------
// MockVoiceAudio  (test-only)
// ---------------------------------------------------------------------------

/// Test double: pretends every download and conversion succeeds and hands
/// back a fixed WAV path.
#[cfg(test)]
pub struct MockVoiceAudio {
    wav: PathBuf,
}

#[cfg(test)]
impl MockVoiceAudio {
    pub fn new(wav: impl Into<PathBuf>) -> Self {
        Self { wav: wav.into() }
    }
}

#[cfg(test)]
#[async_trait]
impl VoiceAudio for MockVoiceAudio {
    async fn fetch(&self, _file_id: &str, _stem: &str) -> Result<(), AudioError> {
        Ok(())
    }

    async fn prepare_wav(&self, _stem: &str) -> Result<PathBuf, AudioError> {
        Ok(self.wav.clone())
    }

    fn discard(&self, _stem: &str) {}
}

#[cfg(test)]
pub use failing::FailingVoiceAudio;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
