//! Voice-file handling: naming, download/convert pipeline, WAV probing.
//!
//! This module provides:
//! * [`VoiceAudio`] — trait the conversation layer uses to fetch, convert
//!   and discard voice files.
//! * [`FfmpegConverter`] — awaited external `ffmpeg` OGG → WAV conversion.
//! * [`VoiceFiles`] / [`voice_stem`] — work-directory file naming.
//! * [`wav_channel_count`] — header probe for the speech-to-text payload.

pub mod convert;
pub mod voice;
pub mod wav;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use convert::FfmpegConverter;
pub use voice::{voice_stem, AudioError, VoiceAudio, VoiceFiles};
pub use wav::wav_channel_count;

#[cfg(test)]
pub use voice::{FailingVoiceAudio, MockVoiceAudio};
