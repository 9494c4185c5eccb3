//! DispatchClient - HTTP dispatch with bounded timeout and retry.
//!
//! Performs the attempt sequence for one logical user message against the
//! remote chat endpoint. All transport errors are absorbed here and re-emerge
//! as one terminal classified [`DispatchOutcome`].

use async_trait::async_trait;
use causette_core::message::now_iso;
use causette_core::{DispatchOutcome, Dispatcher, FailureKind, WidgetConfig, WidgetStore};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for the remote chat endpoint.
///
/// Owns the retry policy: a hard per-request timeout (no retry on timeout),
/// and a fixed backoff between attempts for every other failure, bounded by
/// `max_retries`. Identifiers come from the store so the remote side can
/// correlate retries to one logical turn.
pub struct DispatchClient {
    client: Client,
    endpoint_url: String,
    store: Arc<WidgetStore>,
    request_timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl DispatchClient {
    /// Creates a client with the default policy (15 s timeout, one retry,
    /// 2 s backoff).
    pub fn new(endpoint_url: impl Into<String>, store: Arc<WidgetStore>) -> Self {
        Self::from_config(&WidgetConfig::default(), endpoint_url, store)
    }

    /// Creates a client with the policy knobs taken from `config`.
    pub fn from_config(
        config: &WidgetConfig,
        endpoint_url: impl Into<String>,
        store: Arc<WidgetStore>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint_url: endpoint_url.into(),
            store,
            request_timeout: config.request_timeout(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        }
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the maximum number of automatic retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overrides the wait between attempts.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    async fn attempt(
        &self,
        conversation_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<DispatchOutcome, AttemptError> {
        // The envelope is rebuilt per attempt: fresh timestamp, same
        // identifiers.
        let envelope = RequestEnvelope {
            conversation_id,
            user_id,
            message,
            timestamp: now_iso(),
        };

        let response = self
            .client
            .post(&self.endpoint_url)
            .timeout(self.request_timeout)
            .json(&envelope)
            .send()
            .await
            .map_err(AttemptError::from_reqwest)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::RateLimit);
        }
        if !status.is_success() {
            return Err(AttemptError::BadStatus(status));
        }

        let reply: EndpointReply = response
            .json()
            .await
            .map_err(AttemptError::from_reqwest)?;

        if reply.error.as_ref().is_some_and(is_truthy) {
            let code = reply.code.unwrap_or_else(|| "UNKNOWN_ERROR".to_string());
            return Err(AttemptError::ErrorPayload { code });
        }

        Ok(DispatchOutcome::Success {
            response: reply.response.unwrap_or_default(),
            timestamp: reply.timestamp.unwrap_or_else(now_iso),
            agent_type: reply.agent_type,
        })
    }
}

#[async_trait]
impl Dispatcher for DispatchClient {
    /// Sends one logical message and returns the terminal outcome.
    ///
    /// Total attempts are bounded by `1 + max_retries`. A timeout
    /// short-circuits: the in-flight request is cancelled and no retry is
    /// made. Every other failure is retried after the fixed backoff until the
    /// budget is exhausted, then classified.
    async fn send(&self, message: &str) -> DispatchOutcome {
        let conversation_id = self.store.get_or_create_conversation_id();
        let user_id = self.store.get_or_create_user_id();

        let mut attempt = 0u32;
        loop {
            match self.attempt(&conversation_id, &user_id, message).await {
                Ok(outcome) => {
                    tracing::debug!(attempt, "message dispatched");
                    return outcome;
                }
                Err(AttemptError::Timeout) => {
                    tracing::debug!(attempt, "request timed out, not retrying");
                    return DispatchOutcome::Failure {
                        kind: FailureKind::Timeout,
                    };
                }
                Err(err) if attempt < self.max_retries => {
                    tracing::debug!(attempt, ?err, "dispatch attempt failed, retrying");
                    tokio::time::sleep(self.retry_backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    let kind = err.classify();
                    tracing::debug!(attempt, ?err, ?kind, "dispatch failed");
                    return DispatchOutcome::Failure { kind };
                }
            }
        }
    }
}

/// One attempt's failure, before terminal classification.
#[derive(Debug)]
enum AttemptError {
    Timeout,
    RateLimit,
    Transport(String),
    BadStatus(StatusCode),
    ErrorPayload { code: String },
    MalformedBody(String),
}

impl AttemptError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AttemptError::Timeout
        } else if err.is_decode() {
            AttemptError::MalformedBody(err.to_string())
        } else {
            AttemptError::Transport(err.to_string())
        }
    }

    fn classify(&self) -> FailureKind {
        match self {
            AttemptError::Timeout => FailureKind::Timeout,
            AttemptError::RateLimit => FailureKind::RateLimit,
            AttemptError::Transport(_) => FailureKind::NetworkError,
            // The endpoint's error code gets the same treatment as a raised
            // error message: a rate-limit code is a rate limit, a code
            // carrying the network-failure signature is a network error.
            AttemptError::ErrorPayload { code } => {
                if code == "RATE_LIMIT" {
                    FailureKind::RateLimit
                } else if code.contains("fetch") || code.contains("network") {
                    FailureKind::NetworkError
                } else {
                    FailureKind::ServiceError
                }
            }
            AttemptError::BadStatus(_) | AttemptError::MalformedBody(_) => {
                FailureKind::ServiceError
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestEnvelope<'a> {
    conversation_id: &'a str,
    user_id: &'a str,
    message: &'a str,
    timestamp: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointReply {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    agent_type: Option<String>,
    /// The endpoint signals an application-level error by a truthy value
    /// here, with an optional error code alongside.
    #[serde(default)]
    error: Option<JsonValue>,
    #[serde(default)]
    code: Option<String>,
}

/// JavaScript truthiness: null, false, 0 and "" are falsy, everything else
/// (including `{}` and `[]`) is truthy.
fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}
