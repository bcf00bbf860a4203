//! Outgoing replies and the fixed response catalog.
//!
//! The conversation layer never talks to the transport directly: every
//! handler returns [`Reply`] values and the event loop ships them. A reply
//! is text plus an optional named keyboard and a rich-text flag — exactly
//! the surface the transport needs, nothing transport-specific.

use crate::recognize::Language;

// ---------------------------------------------------------------------------
// Keyboard
// ---------------------------------------------------------------------------

/// The fixed set of reply keyboards the bot ever shows.
///
/// Layouts live with the transport; the conversation layer only names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Main menu: all the query triggers.
    Entries,
    /// Language choices for the manual-recognition fallback.
    Languages,
    /// Today / Yesterday / Past week shortcuts.
    FrequentDates,
    /// Frequently used topics (the `None` sentinel).
    FrequentTopics,
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// One outgoing chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    pub html: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            html: true,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

// ---------------------------------------------------------------------------
// Response catalog
// ---------------------------------------------------------------------------

/// Canned responses, one constructor per conversational situation.
pub mod responses {
    use super::{Keyboard, Reply};

    pub fn start(user_id: i64) -> Reply {
        Reply::html(format!(
            "Hello there!\n\
             I can recognize phrases from your voice messages, convert them to \
             text, and keep them as journal entries. Send me a voice message to \
             start.\n\
             Your voice messages are downloaded for processing and deleted right \
             after the entry is stored. Your chat ID ({user_id}) separates you \
             from the other users.\n\n\
             I support messages in <b>English</b> 🇺🇸, <b>Ukrainian</b> 🇺🇦 and \
             <b>Russian</b> 🇷🇺"
        ))
        .with_keyboard(Keyboard::Entries)
    }

    pub fn choose_topic() -> Reply {
        Reply::plain("Please select the topic for this entry.")
            .with_keyboard(Keyboard::FrequentTopics)
    }

    pub fn choose_language() -> Reply {
        Reply::plain("Now select the language of your voice message.")
            .with_keyboard(Keyboard::Languages)
    }

    pub fn ask_for_date() -> Reply {
        Reply::html(
            "Send me a date in format: <b>YYYY-mm-dd HH:MM:SS</b> or just \
             <b>YYYY-mm-dd</b>.",
        )
        .with_keyboard(Keyboard::FrequentDates)
    }

    pub fn ask_for_two_dates() -> Reply {
        Reply::html(
            "Send me two dates separated by space in format: \
             <b>YYYY-mm-dd HH:MM:SS YYYY-mm-dd HH:MM:SS</b> or just \
             <b>YYYY-mm-dd YYYY-mm-dd</b>.",
        )
    }

    pub fn ask_for_count() -> Reply {
        Reply::plain("Send me a number of entries you want to get.")
    }

    pub fn ask_for_topic() -> Reply {
        Reply::plain("Send me a topic name to search for.")
            .with_keyboard(Keyboard::FrequentTopics)
    }

    pub fn entry_card(card: String) -> Reply {
        Reply::html(card).with_keyboard(Keyboard::Entries)
    }

    pub fn no_entries() -> Reply {
        Reply::html("No entries found!").with_keyboard(Keyboard::Entries)
    }

    pub fn entry_stored(key: &str) -> Reply {
        Reply::html(format!("Message stored: <b>{key}</b>"))
            .with_keyboard(Keyboard::Entries)
    }

    pub fn entry_removed(key: &str) -> Reply {
        Reply::html(format!("Successfully removed the entry: <b>{key}</b>"))
            .with_keyboard(Keyboard::Entries)
    }

    pub fn not_recognized() -> Reply {
        Reply::plain("Unable to process your voice message. Try re-recording it.")
            .with_keyboard(Keyboard::Entries)
    }

    pub fn error() -> Reply {
        Reply::plain("An error has occurred. Please try again later.")
            .with_keyboard(Keyboard::Entries)
    }
}

/// Button label for a language choice: flag plus locale tag.
pub fn language_button(language: Language) -> String {
    format!("{} {}", language.flag(), language.code())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
