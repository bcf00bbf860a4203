//! Telegram transport glue.
//!
//! The conversation core never imports from here — it sees [`ChatEvent`]s
//! going in and [`Reply`]s coming out. This module owns the Bot API
//! client, the wire types, the keyboard layouts and the production
//! voice-file pipeline, and converts between the two worlds.
//!
//! [`ChatEvent`]: crate::session::ChatEvent
//! [`Reply`]: crate::session::Reply

pub mod api;
pub mod keyboards;
pub mod types;
pub mod voice;

use crate::session::ChatEvent;
use crate::telegram::types::Update;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use api::{BotApi, TelegramError};
pub use voice::TelegramVoiceAudio;

/// Reduce an update to a conversation event, if it carries one.
///
/// The sender id keys the session; messages without a sender (channel
/// posts, service messages) and non-text, non-voice content are skipped.
pub fn event_from_update(update: &Update) -> Option<ChatEvent> {
    let message = update.message.as_ref()?;
    let user = message.from.as_ref()?.id;

    if let Some(voice) = &message.voice {
        log::debug!("voice message ({}s) from {user}", voice.duration);
        return Some(ChatEvent::Voice {
            user,
            file_id: voice.file_id.clone(),
        });
    }

    message.text.as_ref().map(|text| ChatEvent::Text {
        user,
        text: text.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(json: serde_json::Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn text_message_becomes_text_event() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 2,
                "from": { "id": 7 },
                "chat": { "id": 7 },
                "text": "by topic"
            }
        }));

        match event_from_update(&u) {
            Some(ChatEvent::Text { user, text }) => {
                assert_eq!(user, 7);
                assert_eq!(text, "by topic");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn voice_wins_over_caption_text() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 2,
                "from": { "id": 7 },
                "chat": { "id": 7 },
                "text": "ignored",
                "voice": { "file_id": "F123" }
            }
        }));

        assert!(matches!(
            event_from_update(&u),
            Some(ChatEvent::Voice { user: 7, file_id }) if file_id == "F123"
        ));
    }

    #[test]
    fn updates_without_sender_or_content_are_skipped() {
        let no_message = update(serde_json::json!({ "update_id": 1 }));
        assert!(event_from_update(&no_message).is_none());

        let no_sender = update(serde_json::json!({
            "update_id": 1,
            "message": { "message_id": 2, "chat": { "id": 7 }, "text": "hi" }
        }));
        assert!(event_from_update(&no_sender).is_none());

        let sticker_only = update(serde_json::json!({
            "update_id": 1,
            "message": { "message_id": 2, "from": { "id": 7 }, "chat": { "id": 7 } }
        }));
        assert!(event_from_update(&sticker_only).is_none());
    }
}
