//! Firebase Realtime Database backend.
//!
//! Entries live in the JSON tree at `users/{id}/entries/{date}`; the
//! document body is `{timestamp, topic, text, language}` with the date
//! carried by the key itself. Range and recency queries push the bound to
//! the server via `orderBy`/`startAt`/`endAt`/`limitToLast` and re-sort on
//! the client, since the REST response is an unordered JSON map.

use async_trait::async_trait;

use crate::config::FirebaseConfig;
use crate::journal::dates::{date_to_timestamp, next_day_timestamp, timestamp_to_date};
use crate::journal::Entry;
use crate::store::entry_store::{EntryStore, StoreError, UserId};

// ---------------------------------------------------------------------------
// FirebaseStore
// ---------------------------------------------------------------------------

/// Entry store talking to the Realtime Database REST surface.
pub struct FirebaseStore {
    client: reqwest::Client,
    database_url: String,
    auth_token: Option<String>,
}

impl FirebaseStore {
    /// Build the store from application config.
    pub fn from_config(config: &FirebaseConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            database_url: config.database_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    fn collection_url(&self, user: UserId) -> String {
        format!("{}/users/{user}/entries.json", self.database_url)
    }

    fn document_url(&self, user: UserId, date: &str) -> String {
        format!(
            "{}/users/{user}/entries/{}.json",
            self.database_url,
            encode_key(date)
        )
    }

    fn auth_query(&self) -> Vec<(&'static str, String)> {
        match &self.auth_token {
            Some(token) => vec![("auth", token.clone())],
            None => Vec::new(),
        }
    }

    async fn read_value(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, StoreError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StoreError::Unknown(e.to_string()))
    }

    /// Run an `orderBy("timestamp")` query with the given extra parameters
    /// and return the decoded entries sorted ascending.
    async fn timestamp_query(
        &self,
        user: UserId,
        params: &[(&'static str, String)],
    ) -> Result<Vec<Entry>, StoreError> {
        let mut query = self.auth_query();
        query.push(("orderBy", "\"timestamp\"".to_string()));
        for (name, value) in params {
            query.push((*name, value.clone()));
        }

        let value = self
            .read_value(self.client.get(self.collection_url(user)).query(&query))
            .await?;

        let mut entries = entries_from_map(&value);
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }
}

#[async_trait]
impl EntryStore for FirebaseStore {
    async fn create(&self, user: UserId, entry: &Entry) -> Result<String, StoreError> {
        let body = serde_json::json!({
            "timestamp": entry.timestamp,
            "topic":     entry.topic,
            "text":      entry.text,
            "language":  entry.language,
        });

        let response = self
            .client
            .put(self.document_url(user, &entry.date))
            .query(&self.auth_query())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(entry.date.clone())
    }

    async fn delete(&self, user: UserId, timestamp: i64) -> Result<String, StoreError> {
        let date =
            timestamp_to_date(timestamp).map_err(|e| StoreError::Unknown(e.to_string()))?;

        let response = self
            .client
            .delete(self.document_url(user, &date))
            .query(&self.auth_query())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        Ok(date)
    }

    async fn fetch_all(&self, user: UserId) -> Result<Vec<Entry>, StoreError> {
        let value = self
            .read_value(
                self.client
                    .get(self.collection_url(user))
                    .query(&self.auth_query()),
            )
            .await?;
        Ok(entries_from_map(&value))
    }

    async fn fetch_exact(
        &self,
        user: UserId,
        date: &str,
    ) -> Result<Option<Entry>, StoreError> {
        let value = self
            .read_value(
                self.client
                    .get(self.document_url(user, date))
                    .query(&self.auth_query()),
            )
            .await?;
        Ok(entry_from_doc(date, &value))
    }

    async fn fetch_by_day(
        &self,
        user: UserId,
        day_start: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let lower =
            date_to_timestamp(day_start).map_err(|e| StoreError::Unknown(e.to_string()))?;
        let upper =
            next_day_timestamp(day_start).map_err(|e| StoreError::Unknown(e.to_string()))?;

        // endAt is inclusive; timestamps are whole seconds, so the half-open
        // day range ends at upper - 1.
        self.timestamp_query(
            user,
            &[
                ("startAt", lower.to_string()),
                ("endAt", (upper - 1).to_string()),
            ],
        )
        .await
    }

    async fn fetch_by_topic(
        &self,
        user: UserId,
        topic: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let mut query = self.auth_query();
        query.push(("orderBy", "\"topic\"".to_string()));
        query.push(("equalTo", serde_json::Value::from(topic).to_string()));

        let value = self
            .read_value(self.client.get(self.collection_url(user)).query(&query))
            .await?;

        let mut entries = entries_from_map(&value);
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn fetch_last_n(&self, user: UserId, n: usize) -> Result<Vec<Entry>, StoreError> {
        let mut entries = self
            .timestamp_query(user, &[("limitToLast", n.to_string())])
            .await?;
        entries.reverse();
        Ok(entries)
    }

    async fn fetch_between(
        &self,
        user: UserId,
        date1: &str,
        date2: &str,
    ) -> Result<Vec<Entry>, StoreError> {
        let ts1 = date_to_timestamp(date1).map_err(|e| StoreError::Unknown(e.to_string()))?;
        let ts2 = date_to_timestamp(date2).map_err(|e| StoreError::Unknown(e.to_string()))?;

        if ts1 == ts2 {
            return Ok(self.fetch_exact(user, date1).await?.into_iter().collect());
        }

        self.timestamp_query(
            user,
            &[
                ("startAt", ts1.min(ts2).to_string()),
                ("endAt", ts1.max(ts2).to_string()),
            ],
        )
        .await
    }

    async fn fetch_after(&self, user: UserId, date: &str) -> Result<Vec<Entry>, StoreError> {
        let bound =
            date_to_timestamp(date).map_err(|e| StoreError::Unknown(e.to_string()))?;
        // Exclusive lower bound: startAt is inclusive, timestamps are whole
        // seconds.
        self.timestamp_query(user, &[("startAt", (bound + 1).to_string())])
            .await
    }
}

// ---------------------------------------------------------------------------
// Wire helpers
// ---------------------------------------------------------------------------

/// Percent-encode the canonical date for use as a URL path segment.
pub(crate) fn encode_key(date: &str) -> String {
    date.replace(' ', "%20")
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() || e.is_connect() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Unknown(e.to_string())
    }
}

fn status_error(status: reqwest::StatusCode) -> StoreError {
    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
    {
        StoreError::AccessDenied(status.to_string())
    } else if status.is_server_error() {
        StoreError::Unavailable(status.to_string())
    } else {
        StoreError::Unknown(format!("HTTP {status}"))
    }
}

/// Decode one document body; `null` (missing document) and malformed
/// bodies both come back as `None`.
pub(crate) fn entry_from_doc(date: &str, doc: &serde_json::Value) -> Option<Entry> {
    let timestamp = doc["timestamp"].as_i64()?;
    Some(Entry {
        topic: doc["topic"].as_str().unwrap_or_default().to_string(),
        text: doc["text"].as_str().unwrap_or_default().to_string(),
        date: date.to_string(),
        timestamp,
        language: doc["language"].as_str().unwrap_or_default().to_string(),
    })
}

/// Decode a collection response: a JSON map of `date → document`.
pub(crate) fn entries_from_map(value: &serde_json::Value) -> Vec<Entry> {
    let Some(map) = value.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(date, doc)| entry_from_doc(date, doc))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
