//! Application configuration (TOML settings + platform paths).

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AudioConfig, BotConfig, FirebaseConfig, SpeechConfig, StorageBackend, TelegramConfig,
};
