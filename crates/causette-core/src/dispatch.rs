//! Dispatch outcome types and the dispatcher seam.
//!
//! The HTTP client lives in `causette-interaction`; this module defines the
//! contract the conversation layer programs against, so the controller can be
//! exercised without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Classified failure of a turn.
///
/// The first four kinds are terminal dispatch classifications; `InvalidMessage`
/// is produced by local validation and never reaches the network layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// No response within the request timeout.
    Timeout,
    /// The endpoint answered 429.
    RateLimit,
    /// Transport-level failure (connection refused, DNS, reset).
    NetworkError,
    /// Anything else: bad status, error payload, malformed body.
    ServiceError,
    /// Local validation rejection; no network call was made.
    InvalidMessage,
}

impl FailureKind {
    /// Fixed, localized message for user display.
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::NetworkError => "Oups, problème de connexion. Peux-tu réessayer ?",
            FailureKind::RateLimit => {
                "Tu as envoyé beaucoup de messages ! Attends quelques instants."
            }
            FailureKind::ServiceError => {
                "Désolée, je rencontre un petit souci technique. Réessaie dans un instant !"
            }
            FailureKind::Timeout => {
                "La réponse prend un peu de temps... Peux-tu renvoyer ton message ?"
            }
            FailureKind::InvalidMessage => {
                "Oups, ton message semble vide. Écris-moi quelque chose !"
            }
        }
    }
}

/// Terminal outcome of one dispatch sequence (all internal retries included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success {
        /// Assistant response text.
        response: String,
        /// Endpoint-reported timestamp, or the local clock if none was given.
        timestamp: String,
        /// Which remote agent answered, if reported.
        agent_type: Option<String>,
    },
    Failure {
        kind: FailureKind,
    },
}

/// Sends one logical message to the remote endpoint.
///
/// Implementations own timeout and retry policy: the caller only ever observes
/// the terminal outcome, never intermediate attempts, and never a raw
/// transport error.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn send(&self, message: &str) -> DispatchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_kind_has_a_distinct_user_message() {
        let kinds = [
            FailureKind::Timeout,
            FailureKind::RateLimit,
            FailureKind::NetworkError,
            FailureKind::ServiceError,
            FailureKind::InvalidMessage,
        ];

        for (i, kind) in kinds.iter().enumerate() {
            assert!(!kind.user_message().is_empty());
            for other in &kinds[i + 1..] {
                assert_ne!(kind.user_message(), other.user_message());
            }
        }
    }
}
