//! The entry-store façade trait and its failure taxonomy.

use async_trait::async_trait;
use thiserror::Error;

use crate::journal::Entry;

/// Stable per-user identifier handed in by the chat transport.
pub type UserId = i64;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// External-service failure kinds reported by every store operation.
///
/// None of these is fatal to the conversation: callers log the failure and
/// render the result as "no entries found" instead of crashing the turn.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Credentials rejected by the backing service.
    #[error("store access denied: {0}")]
    AccessDenied(String),

    /// The backing service is unreachable or overloaded.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Anything else — malformed response, unexpected status, bad key.
    #[error("store error: {0}")]
    Unknown(String),
}

// ---------------------------------------------------------------------------
// EntryStore trait
// ---------------------------------------------------------------------------

/// Async query façade over the per-user, per-date entry collection.
///
/// Documents are addressed by `(user, date)` where `date` is the canonical
/// `YYYY-MM-DD HH:MM:SS` string; `timestamp` drives every ordering and
/// range bound. Object-safe and `Send + Sync` so the conversation layer
/// can hold it behind an `Arc<dyn EntryStore>`.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Upsert `entry` under its `date` key; a second create at the same
    /// exact second overwrites. Returns the key used, for confirmation
    /// messaging.
    async fn create(&self, user: UserId, entry: &Entry) -> Result<String, StoreError>;

    /// Delete the entry whose `date` corresponds to `timestamp`.
    /// Idempotent — deleting a missing key is not an error. Returns the
    /// derived key.
    async fn delete(&self, user: UserId, timestamp: i64) -> Result<String, StoreError>;

    /// The user's full entry set, in no guaranteed order.
    async fn fetch_all(&self, user: UserId) -> Result<Vec<Entry>, StoreError>;

    /// Direct key lookup.
    async fn fetch_exact(&self, user: UserId, date: &str)
        -> Result<Option<Entry>, StoreError>;

    /// Half-open whole-day range `[day 00:00:00, next day 00:00:00)`,
    /// timestamp ascending.
    async fn fetch_by_day(&self, user: UserId, day_start: &str)
        -> Result<Vec<Entry>, StoreError>;

    /// Equality filter on `topic`.
    async fn fetch_by_topic(&self, user: UserId, topic: &str)
        -> Result<Vec<Entry>, StoreError>;

    /// The `n` most recent entries, timestamp descending.
    async fn fetch_last_n(&self, user: UserId, n: usize) -> Result<Vec<Entry>, StoreError>;

    /// Inclusive range `[min(ts1, ts2), max(ts1, ts2)]`, ascending. Equal
    /// dates degenerate to [`fetch_exact`](Self::fetch_exact).
    async fn fetch_between(
        &self,
        user: UserId,
        date1: &str,
        date2: &str,
    ) -> Result<Vec<Entry>, StoreError>;

    /// Entries strictly after `date`, ascending.
    async fn fetch_after(&self, user: UserId, date: &str)
        -> Result<Vec<Entry>, StoreError>;
}

// Compile-time assertion: the trait must stay object-safe.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn EntryStore>) {}
};
