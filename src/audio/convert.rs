//! OGG → WAV conversion through an external `ffmpeg` process.
//!
//! The legacy behaviour launched the converter and slept a fixed interval
//! before reading the output file — a race when conversion ran long. Here
//! the child process is awaited with an explicit timeout; the completion
//! signal is its exit status, never the clock.

use std::path::Path;
use std::time::Duration;

use crate::audio::AudioError;

// ---------------------------------------------------------------------------
// FfmpegConverter
// ---------------------------------------------------------------------------

/// Wraps the `ffmpeg` binary for voice-file conversion.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    ffmpeg_path: String,
    timeout_secs: u64,
}

impl FfmpegConverter {
    pub fn new(ffmpeg_path: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            timeout_secs,
        }
    }

    /// Convert `ogg` into `wav`, waiting for the converter to exit.
    ///
    /// An already-existing output file is reused. A missing input, a
    /// non-zero exit status, or a conversion running past the configured
    /// timeout all fail the turn.
    pub async fn ogg_to_wav(&self, ogg: &Path, wav: &Path) -> Result<(), AudioError> {
        if wav.exists() {
            return Ok(());
        }
        if !ogg.exists() {
            return Err(AudioError::FileAccess(ogg.display().to_string()));
        }

        let child = tokio::process::Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(ogg)
            .arg(wav)
            .args(["-loglevel", "quiet"])
            .output();

        let output = tokio::time::timeout(Duration::from_secs(self.timeout_secs), child)
            .await
            .map_err(|_| AudioError::Timeout(self.timeout_secs))?
            .map_err(|e| AudioError::Convert(e.to_string()))?;

        if !output.status.success() {
            return Err(AudioError::Convert(format!(
                "ffmpeg exited with {}",
                output.status
            )));
        }

        log::debug!("audio: converted {} → {}", ogg.display(), wav.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_input_is_a_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let converter = FfmpegConverter::new("ffmpeg", 5);
        let err = converter
            .ogg_to_wav(&dir.path().join("absent.ogg"), &dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::FileAccess(_)));
    }

    #[tokio::test]
    async fn existing_output_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("done.wav");
        std::fs::write(&wav, b"cached").unwrap();

        // No input file and no ffmpeg binary needed — the cached output wins.
        let converter = FfmpegConverter::new("/nonexistent/ffmpeg", 5);
        converter
            .ogg_to_wav(&dir.path().join("absent.ogg"), &wav)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unlaunchable_converter_is_a_convert_error() {
        let dir = tempfile::tempdir().unwrap();
        let ogg = dir.path().join("voice.ogg");
        std::fs::write(&ogg, b"ogg bytes").unwrap();

        let converter = FfmpegConverter::new("/nonexistent/ffmpeg", 5);
        let err = converter
            .ogg_to_wav(&ogg, &dir.path().join("out.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioError::Convert(_)));
    }
}
