//! Identity and cache store.
//!
//! Durable per-installation identifiers and a time-boxed cache of the message
//! history, abstracted behind a string-keyed backend. Persistence is
//! best-effort by design: a storage outage degrades to "no history survives a
//! reload", never to a broken messaging path, so nothing here returns an
//! error to the caller.

use crate::message::ChatMessage;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Storage keys owned by the store.
mod keys {
    pub const USER_ID: &str = "causette_user_id";
    pub const CONVERSATION_ID: &str = "causette_conversation_id";
    pub const MESSAGES_CACHE: &str = "causette_messages_cache";
    pub const CACHE_TIMESTAMP: &str = "causette_cache_timestamp";
}

/// An abstract string-keyed store (the moral equivalent of browser
/// `localStorage`).
///
/// Implementations must be infallible at this surface: internal failures are
/// swallowed (and logged), `get` degrades to `None`, writes are best-effort.
pub trait StoreBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Why a cache read yielded nothing.
///
/// All three reasons take the same path at the product level (the caller
/// seeds a fresh conversation); they are distinguished so the conditions stay
/// observable in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentReason {
    /// No cached sequence or no save timestamp was stored.
    Missing,
    /// The entry was older than the retention window.
    Expired,
    /// The stored payload or timestamp failed to parse.
    Corrupt,
}

/// Result of a cache read: a fully parsed, non-expired sequence, or nothing.
///
/// A read is all-or-nothing; there is no partially valid entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Present(Vec<ChatMessage>),
    Absent(AbsentReason),
}

impl CacheLookup {
    /// Collapses the lookup to the product-level view.
    pub fn into_messages(self) -> Option<Vec<ChatMessage>> {
        match self {
            CacheLookup::Present(messages) => Some(messages),
            CacheLookup::Absent(_) => None,
        }
    }
}

/// Durable identifiers plus the time-boxed message cache.
///
/// Owns four logical keys: user id, conversation id, the cached sequence
/// (JSON array) and its save timestamp (epoch milliseconds).
pub struct WidgetStore {
    backend: Arc<dyn StoreBackend>,
    retention: Duration,
}

impl WidgetStore {
    /// Creates a store over the given backend with the given cache retention
    /// window.
    pub fn new(backend: Arc<dyn StoreBackend>, retention: Duration) -> Self {
        Self { backend, retention }
    }

    /// Returns the stored user id, generating and persisting one on first use.
    ///
    /// Performs one write on the first call only; subsequent calls return the
    /// same value.
    pub fn get_or_create_user_id(&self) -> String {
        self.get_or_create(keys::USER_ID)
    }

    /// Returns the stored conversation id, generating and persisting one on
    /// first use. Independent of the user id.
    pub fn get_or_create_conversation_id(&self) -> String {
        self.get_or_create(keys::CONVERSATION_ID)
    }

    fn get_or_create(&self, key: &str) -> String {
        if let Some(id) = self.backend.get(key) {
            return id;
        }
        let id = Uuid::new_v4().to_string();
        self.backend.set(key, &id);
        tracing::debug!(key, %id, "created new identifier");
        id
    }

    /// Starts a fresh conversation: a new conversation id is stored and the
    /// cached sequence (and its timestamp) is removed. The user id is not
    /// touched. Returns the new conversation id.
    pub fn reset_conversation(&self) -> String {
        let conversation_id = Uuid::new_v4().to_string();
        self.backend.set(keys::CONVERSATION_ID, &conversation_id);
        self.backend.remove(keys::MESSAGES_CACHE);
        self.backend.remove(keys::CACHE_TIMESTAMP);
        tracing::debug!(%conversation_id, "conversation reset");
        conversation_id
    }

    /// Loads the cached message sequence.
    ///
    /// Returns `Present` only if both the payload and its save timestamp are
    /// stored, parse cleanly, and the entry is within the retention window.
    /// Never raises: missing keys, parse failures and expiry all yield
    /// `Absent`.
    pub fn load_cache(&self) -> CacheLookup {
        let (Some(cached), Some(timestamp)) = (
            self.backend.get(keys::MESSAGES_CACHE),
            self.backend.get(keys::CACHE_TIMESTAMP),
        ) else {
            return CacheLookup::Absent(AbsentReason::Missing);
        };

        let Ok(saved_at) = timestamp.parse::<i64>() else {
            tracing::debug!("cache timestamp unparseable, treating as miss");
            return CacheLookup::Absent(AbsentReason::Corrupt);
        };

        let age_ms = Utc::now().timestamp_millis().saturating_sub(saved_at);
        if age_ms > self.retention.as_millis() as i64 {
            tracing::debug!(age_ms, "cache expired");
            return CacheLookup::Absent(AbsentReason::Expired);
        }

        match serde_json::from_str::<Vec<ChatMessage>>(&cached) {
            Ok(messages) => {
                tracing::debug!(age_ms, count = messages.len(), "cache hit");
                CacheLookup::Present(messages)
            }
            Err(err) => {
                tracing::debug!(%err, "cached messages unparseable, treating as miss");
                CacheLookup::Absent(AbsentReason::Corrupt)
            }
        }
    }

    /// Persists the full message sequence and records the current time as its
    /// save timestamp.
    ///
    /// Never raises: if serialization or the backend write fails, the
    /// in-memory sequence stays authoritative for the current session.
    pub fn save_cache(&self, messages: &[ChatMessage]) {
        match serde_json::to_string(messages) {
            Ok(json) => {
                self.backend.set(keys::MESSAGES_CACHE, &json);
                self.backend
                    .set(keys::CACHE_TIMESTAMP, &Utc::now().timestamp_millis().to_string());
                tracing::debug!(count = messages.len(), "messages saved to cache");
            }
            Err(err) => {
                tracing::warn!(%err, "failed to serialize message cache, skipping save");
            }
        }
    }

    /// Removes every key this store owns. Used for a full reset, not the
    /// per-conversation reset.
    pub fn clear_all(&self) {
        for key in [
            keys::USER_ID,
            keys::CONVERSATION_ID,
            keys::MESSAGES_CACHE,
            keys::CACHE_TIMESTAMP,
        ] {
            self.backend.remove(key);
        }
        tracing::debug!("all store data cleared");
    }
}
