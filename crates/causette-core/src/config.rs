//! Client configuration and fixed message sets.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the dispatch and persistence behavior of the client.
///
/// Every field has a default so a partial (or missing) config file yields a
/// working configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    /// Remote chat endpoint (single POST endpoint).
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Hard per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Maximum automatic retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed wait between attempts in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Maximum age of the cached history before it is treated as absent.
    #[serde(default = "default_cache_retention_ms")]
    pub cache_retention_ms: u64,
    /// Maximum accepted message length, in characters.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl WidgetConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn cache_retention(&self) -> Duration {
        Duration::from_millis(self.cache_retention_ms)
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_retention_ms: default_cache_retention_ms(),
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_endpoint_url() -> String {
    "http://localhost:8000/chat".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    2_000
}

fn default_cache_retention_ms() -> u64 {
    5 * 60 * 1000
}

fn default_max_message_length() -> usize {
    2_000
}

/// Welcome messages shown when no cached history exists (randomly selected).
pub const WELCOME_MESSAGES: [&str; 3] = [
    "Salut ! Comment puis-je t'aider aujourd'hui ?",
    "Coucou ! Besoin d'un coup de main ? Je suis là pour toi !",
    "Hello ! Pose-moi toutes tes questions, je suis là pour t'accompagner !",
];
