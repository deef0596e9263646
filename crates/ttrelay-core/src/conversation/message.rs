//! Conversation turn types.

use serde::{Deserialize, Serialize};

/// Represents the role of a turn in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single turn in a conversation history.
///
/// Owned exclusively by the history entry it belongs to. The serialized
/// form matches the role/content shape the chat-completion APIs expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    pub content: String,
}

impl Turn {
    /// A user turn with the given content.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn with the given content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_serializes_to_api_role_content_shape() {
        let turn = serde_json::to_value(Turn::user("hello")).unwrap();
        assert_eq!(turn, serde_json::json!({"role": "user", "content": "hello"}));

        let turn = serde_json::to_value(Turn::assistant("hi there")).unwrap();
        assert_eq!(turn["role"], "assistant");
    }
}

