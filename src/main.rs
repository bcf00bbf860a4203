//! Application entry point — Voice Journal bot.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`BotConfig`] from disk (returns default on first run) and let
//!    the environment override the secrets.
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the Bot API client, the entry store and both recognition
//!    strategies from config.
//! 5. Run the long-poll event loop — one update at a time through the
//!    conversation machine; handler failures are logged, never fatal.

use std::sync::Arc;

use voice_journal::{
    audio::{FfmpegConverter, VoiceFiles},
    config::{AppPaths, BotConfig, StorageBackend},
    recognize::{RecognitionGateway, SpeechRecognizer},
    session::{ConversationMachine, SessionStore},
    store::{EntryStore, FirebaseStore, MemoryStore},
    telegram::{event_from_update, BotApi, TelegramVoiceAudio},
};

// ---------------------------------------------------------------------------
// Component builders
// ---------------------------------------------------------------------------

/// Pick the entry-store backend.
///
/// A Firebase selection without a database URL degrades to the in-memory
/// store so the bot still launches; entries then live only until restart.
fn build_store(config: &BotConfig) -> Arc<dyn EntryStore> {
    match config.storage {
        StorageBackend::Firebase if !config.firebase.database_url.is_empty() => {
            log::info!("entry store: firebase ({})", config.firebase.database_url);
            Arc::new(FirebaseStore::from_config(&config.firebase))
        }
        StorageBackend::Firebase => {
            log::warn!(
                "entry store: firebase selected but no database URL configured — \
                 falling back to the in-memory store (entries lost on restart)"
            );
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Memory => {
            log::info!("entry store: in-memory (entries lost on restart)");
            Arc::new(MemoryStore::new())
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Long-poll for updates and feed them through the machine, serially.
///
/// Every failure is caught here: transport errors back off briefly and the
/// poll resumes; an undeliverable reply is logged and dropped. The loop
/// itself never exits.
async fn run_event_loop(api: Arc<BotApi>, mut machine: ConversationMachine) {
    let mut offset: i64 = 0;

    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                log::warn!("getUpdates failed: {e}");
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(event) = event_from_update(&update) else {
                continue;
            };
            let chat_id = match &event {
                voice_journal::session::ChatEvent::Text { user, .. } => *user,
                voice_journal::session::ChatEvent::Voice { user, .. } => *user,
            };

            for reply in machine.dispatch(event).await {
                if let Err(e) = api.send_message(chat_id, &reply).await {
                    log::warn!("reply to {chat_id} not delivered: {e}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice Journal starting up");

    // 2. Configuration
    let mut config = BotConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        BotConfig::default()
    });
    config.apply_env();

    if config.telegram.token.is_empty() {
        anyhow::bail!(
            "no bot token configured — set TELEGRAM_BOT_TOKEN or telegram.token \
             in settings.toml"
        );
    }

    // 3. Tokio runtime (2 workers — recognition and store calls overlap)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // 4. Components
    let api = Arc::new(BotApi::from_config(&config.telegram));
    let store = build_store(&config);

    let auto: Arc<dyn RecognitionGateway> = Arc::new(SpeechRecognizer::from_kind(
        config.speech.auto_recognizer,
        &config.speech,
    ));
    let manual: Arc<dyn RecognitionGateway> = Arc::new(SpeechRecognizer::from_kind(
        config.speech.manual_recognizer,
        &config.speech,
    ));

    let work_dir = config
        .audio
        .work_dir
        .clone()
        .unwrap_or_else(|| AppPaths::new().voices_dir);
    let voice = Arc::new(TelegramVoiceAudio::new(
        Arc::clone(&api),
        VoiceFiles::new(work_dir),
        FfmpegConverter::new(
            config.audio.ffmpeg_path.clone(),
            config.audio.convert_timeout_secs,
        ),
    ));

    let machine = ConversationMachine::new(SessionStore::new(), store, auto, manual, voice);

    // 5. Event loop — blocks forever
    rt.block_on(run_event_loop(api, machine));
    Ok(())
}
