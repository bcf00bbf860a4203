//! In-process entry store.
//!
//! Carries the exact ordering and range semantics of the remote backend so
//! local runs (no credentials) and the conversation tests exercise the
//! real query behaviour. Everything lives in one process-wide map and is
//! lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::journal::dates::{date_to_timestamp, next_day_timestamp, timestamp_to_date};
use crate::journal::Entry;
use crate::store::entry_store::{EntryStore, StoreError, UserId};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Entry store backed by an in-memory map, keyed `user → date → entry`.
///
/// The canonical date format sorts lexicographically in chronological
/// order, so the inner `BTreeMap` already yields ascending ranges.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<UserId, BTreeMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn date_error(e: crate::journal::DateError) -> StoreError {
        StoreError::Unknown(e.to_string())
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn create(&self, user: UserId, entry: &Entry) -> Result<String, StoreError> {
        let mut users = self.users.lock().unwrap();
        users
            .entry(user)
            .or_default()
            .insert(entry.date.clone(), entry.clone());
        Ok(entry.date.clone())
    }

    async fn delete(&self, user: UserId, timestamp: i64) -> Result<String, StoreError> {
        let date = timestamp_to_date(timestamp).map_err(Self::date_error)?;
        let mut users = self.users.lock().unwrap();
        if let Some(entries) = users.get_mut(&user) {
            entries.remove(&date);
        }
        Ok(date)
    }

    async fn fetch_all(&self, user: UserId) -> Result<Vec<Entry>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .get(&user)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_exact(
        &self,
        user: UserId,
        date: &str,
    ) -> Result<Option<Entry>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users.get(&user).and_then(|entries| entries.get(date)).cloned())
    }

    async fn fetch_by_day(
        &self,
        user: UserId,
        day_start: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let lower = date_to_timestamp(day_start).map_err(Self::date_error)?;
        let upper = next_day_timestamp(day_start).map_err(Self::date_error)?;

        let users = self.users.lock().unwrap();
        Ok(users
            .get(&user)
            .map(|entries| {
                entries
                    .values()
                    .filter(|e| e.timestamp >= lower && e.timestamp < upper)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_by_topic(
        &self,
        user: UserId,
        topic: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .get(&user)
            .map(|entries| {
                entries
                    .values()
                    .filter(|e| e.topic == topic)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_last_n(&self, user: UserId, n: usize) -> Result<Vec<Entry>, StoreError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .get(&user)
            .map(|entries| entries.values().rev().take(n).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_between(
        &self,
        user: UserId,
        date1: &str,
        date2: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let ts1 = date_to_timestamp(date1).map_err(Self::date_error)?;
        let ts2 = date_to_timestamp(date2).map_err(Self::date_error)?;

        if ts1 == ts2 {
            return Ok(self.fetch_exact(user, date1).await?.into_iter().collect());
        }

        let (lower, upper) = (ts1.min(ts2), ts1.max(ts2));
        let users = self.users.lock().unwrap();
        Ok(users
            .get(&user)
            .map(|entries| {
                entries
                    .values()
                    .filter(|e| e.timestamp >= lower && e.timestamp <= upper)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_after(&self, user: UserId, date: &str) -> Result<Vec<Entry>, StoreError> {
        let bound = date_to_timestamp(date).map_err(Self::date_error)?;
        let users = self.users.lock().unwrap();
        Ok(users
            .get(&user)
            .map(|entries| {
                entries
                    .values()
                    .filter(|e| e.timestamp > bound)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
