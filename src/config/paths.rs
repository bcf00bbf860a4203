//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\voice-journal\
//!   macOS:   ~/Library/Application Support/voice-journal/
//!   Linux:   ~/.config/voice-journal/
//!
//! Data dir (in-flight voice files):
//!   Windows: %LOCALAPPDATA%\voice-journal\
//!   macOS:   ~/Library/Application Support/voice-journal/
//!   Linux:   ~/.local/share/voice-journal/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory where downloaded/converted voice files live while a
    /// capture is in flight.
    pub voices_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-journal";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let voices_dir = data_dir.join("voices");

        Self {
            config_dir,
            settings_file,
            voices_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
