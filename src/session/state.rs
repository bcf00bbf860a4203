//! Per-user conversation states.
//!
//! The state machine transitions are:
//!
//! ```text
//! Idle ──voice──▶ CapturingTopic ──topic──▶ AutoLanguageDetect
//!                   AutoLanguageDetect ──ok──────────────▶ Idle (stored)
//!                   AutoLanguageDetect ──access denied──▶ CapturingLanguage
//!                   CapturingLanguage ──language──▶ ProcessingAudio ──▶ Idle
//! Idle ──query trigger──▶ Query* ──parameter──▶ Idle (rendered)
//! any failure ──▶ Idle (session cleared)
//! ```

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// What kind of input the conversation currently expects from a user.
///
/// Every new or freshly registered user starts at `Idle`; query and capture
/// states are transient and return to `Idle` when the turn completes or
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing in flight — voice messages and query triggers are accepted.
    #[default]
    Idle,

    /// A voice message arrived; waiting for the entry topic.
    CapturingTopic,

    /// Automatic language detection rejected the credentials; waiting for a
    /// manual language choice.
    CapturingLanguage,

    /// Topic captured; the auto-detect recognition call is in flight.
    AutoLanguageDetect,

    /// Manual language chosen; the dictation recognition call is in flight.
    ProcessingAudio,

    /// Waiting for nothing — "all entries" executes immediately.
    QueryAll,

    /// Waiting for the entry count.
    QueryLastN,

    /// Waiting for a single date (exact or whole-day).
    QueryByDate,

    /// Waiting for a two-date range.
    QueryBetween,

    /// Waiting for a single lower-bound date.
    QueryAfter,

    /// Waiting for a topic name.
    QueryByTopic,
}

impl SessionState {
    /// True while a voice capture is in flight.
    ///
    /// While a user is in any capture state, query triggers and new voice
    /// messages are ignored — at most one in-flight entry per user.
    pub fn is_capturing(self) -> bool {
        matches!(
            self,
            SessionState::CapturingTopic
                | SessionState::CapturingLanguage
                | SessionState::AutoLanguageDetect
                | SessionState::ProcessingAudio
        )
    }

    /// True for the two query states that take one date parameter and
    /// accept the Today / Yesterday / Past week shortcuts.
    pub fn expects_single_date(self) -> bool {
        matches!(self, SessionState::QueryByDate | SessionState::QueryAfter)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
