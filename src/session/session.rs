//! Per-user session record and the process-wide session store.
//!
//! Sessions are process-lifetime only: a restart loses every in-flight
//! (not-yet-persisted) entry and resets every user to idle. That is a
//! documented limitation, not an accident — durability starts at the entry
//! store.

use std::collections::HashMap;

use crate::audio::voice_stem;
use crate::journal::Entry;
use crate::session::state::SessionState;
use crate::store::UserId;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One user's conversation state plus the entry under construction.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: SessionState,
    pending_entry: Option<Entry>,
}

impl Session {
    /// Seed the pending entry when a voice message arrives.
    ///
    /// First write wins: a seed while an entry is already pending is
    /// ignored (the capture guard should have blocked the second voice
    /// message before this point).
    pub fn seed_entry(&mut self, date: String, timestamp: i64) {
        if self.pending_entry.is_none() {
            self.pending_entry = Some(Entry::seeded(date, timestamp));
        }
    }

    /// Record the topic unless one was already captured; the auto-detect
    /// fallback path re-enters the flow without losing it.
    pub fn cache_topic(&mut self, topic: &str) {
        if let Some(entry) = self.pending_entry.as_mut() {
            entry.cache_topic(topic);
        }
    }

    /// Attach the recognized language — set exactly once per turn, so it
    /// always overwrites.
    pub fn set_language(&mut self, language: &str) {
        if let Some(entry) = self.pending_entry.as_mut() {
            entry.language = language.to_string();
        }
    }

    /// Attach the transcript — set exactly once per turn, so it always
    /// overwrites.
    pub fn set_text(&mut self, text: &str) {
        if let Some(entry) = self.pending_entry.as_mut() {
            entry.text = text.to_string();
        }
    }

    pub fn pending_entry(&self) -> Option<&Entry> {
        self.pending_entry.as_ref()
    }

    /// Voice-file stem for the in-flight capture, derived from the user id
    /// and the pending entry's timestamp.
    pub fn stem(&self, user: UserId) -> Option<String> {
        self.pending_entry
            .as_ref()
            .map(|entry| voice_stem(user, entry.timestamp))
    }

    /// Drop the in-flight entry and return to idle.
    pub fn clear(&mut self) {
        self.pending_entry = None;
        self.state = SessionState::Idle;
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Explicit map of `user → session`, owned by the conversation machine and
/// passed by reference into the event handlers.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<UserId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's session, created at `Idle` on first contact.
    pub fn get_mut(&mut self, user: UserId) -> &mut Session {
        self.sessions.entry(user).or_default()
    }

    /// Register (or re-register) a user: the session is reset to `Idle`
    /// with no pending entry.
    pub fn register(&mut self, user: UserId) {
        self.sessions.insert(user, Session::default());
    }

    #[cfg(test)]
    pub fn get(&self, user: UserId) -> Option<&Session> {
        self.sessions.get(&user)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
