//! The journaled transcript record.

use serde::{Deserialize, Serialize};

/// Topic value used until the user picks one.
pub const DEFAULT_TOPIC: &str = "None";

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One persisted voice-transcript record.
///
/// `date` (canonical `YYYY-MM-DD HH:MM:SS`) is the document key; `timestamp`
/// is always `epoch(date)` and drives ordering and range queries. Creating a
/// second entry at the same exact second overwrites the first — addressing
/// granularity is one second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub topic: String,
    pub text: String,
    pub date: String,
    pub timestamp: i64,
    pub language: String,
}

impl Entry {
    /// A fresh entry seeded when a voice message arrives.
    ///
    /// Topic starts at the [`DEFAULT_TOPIC`] sentinel; language and text are
    /// filled later in the capture flow.
    pub fn seeded(date: String, timestamp: i64) -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            text: String::new(),
            date,
            timestamp,
            language: String::new(),
        }
    }

    /// Set the topic unless one was already captured.
    ///
    /// First write wins; the [`DEFAULT_TOPIC`] sentinel counts as unset, so
    /// the auto-detect fallback path re-entering the flow keeps an already
    /// chosen topic.
    pub fn cache_topic(&mut self, topic: &str) {
        if self.topic.is_empty() || self.topic == DEFAULT_TOPIC {
            self.topic = topic.to_string();
        }
    }

    /// True once a non-empty transcript has been attached.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
