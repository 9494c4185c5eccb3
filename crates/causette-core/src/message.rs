//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation
//! history, including roles and message content.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the remote assistant.
    Assistant,
}

/// A single message in a conversation history.
///
/// Each message has a role (user or assistant), content, and a timestamp
/// indicating when it was created. Assistant messages may carry the agent
/// identifier reported by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub timestamp: String,
    /// Which remote agent produced the message, if reported.
    #[serde(
        rename = "agentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub agent_type: Option<String>,
}

impl ChatMessage {
    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: now_iso(),
            agent_type: None,
        }
    }

    /// Creates an assistant message.
    ///
    /// `timestamp` is the endpoint's reported time when present; callers fall
    /// back to the local clock via [`now_iso`] otherwise.
    pub fn assistant(
        content: impl Into<String>,
        timestamp: impl Into<String>,
        agent_type: Option<String>,
    ) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: timestamp.into(),
            agent_type,
        }
    }
}

/// The current UTC time in ISO 8601 format with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let message = ChatMessage::user("bonjour");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        // agentType is omitted entirely when absent
        assert!(json.get("agentType").is_none());
    }

    #[test]
    fn agent_type_round_trips() {
        let message = ChatMessage::assistant("salut", now_iso(), Some("audrey".to_string()));
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"agentType\":\"audrey\""));

        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn deserializes_entries_without_agent_type() {
        let json = r#"{"role":"assistant","content":"coucou","timestamp":"2024-01-01T00:00:00.000Z"}"#;
        let message: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.role, MessageRole::Assistant);
        assert_eq!(message.agent_type, None);
    }
}
