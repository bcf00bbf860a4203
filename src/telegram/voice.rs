//! Production voice-file pipeline: Bot API download + `ffmpeg` conversion.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::audio::{AudioError, FfmpegConverter, VoiceAudio, VoiceFiles};
use crate::telegram::api::BotApi;

/// [`VoiceAudio`] backed by the Bot API and an external converter.
pub struct TelegramVoiceAudio {
    api: Arc<BotApi>,
    files: VoiceFiles,
    converter: FfmpegConverter,
}

impl TelegramVoiceAudio {
    pub fn new(api: Arc<BotApi>, files: VoiceFiles, converter: FfmpegConverter) -> Self {
        Self {
            api,
            files,
            converter,
        }
    }
}

#[async_trait]
impl VoiceAudio for TelegramVoiceAudio {
    async fn fetch(&self, file_id: &str, stem: &str) -> Result<(), AudioError> {
        let dest = self.files.ogg_path(stem);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AudioError::Download(format!("{}: {e}", parent.display())))?;
        }

        self.api
            .download_file(file_id, &dest)
            .await
            .map_err(|e| AudioError::Download(e.to_string()))
    }

    async fn prepare_wav(&self, stem: &str) -> Result<PathBuf, AudioError> {
        let ogg = self.files.ogg_path(stem);
        let wav = self.files.wav_path(stem);
        self.converter.ogg_to_wav(&ogg, &wav).await?;
        Ok(wav)
    }

    fn discard(&self, stem: &str) {
        self.files.remove(stem);
    }
}
