//! Minimal WAV header inspection.

use std::io::Read;
use std::path::Path;

/// Read the channel count from a WAV file's RIFF header.
///
/// The speech-to-text backend needs the channel count up front; only the
/// fixed 44-byte canonical header layout produced by the converter is
/// supported.
pub fn wav_channel_count(path: &Path) -> std::io::Result<u16> {
    let mut header = [0u8; 24];
    let mut file = std::fs::File::open(path)?;
    file.read_exact(&mut header)?;

    if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is not a RIFF/WAVE file", path.display()),
        ));
    }

    Ok(u16::from_le_bytes([header[22], header[23]]))
}
