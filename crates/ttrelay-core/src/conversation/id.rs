//! Conversation identity.

use std::fmt;

/// Opaque key identifying one conversation scope.
///
/// Private chats are keyed by username, channel chats by channel id, so a
/// user's private history and a channel's shared history never mix.
/// Identifiers are stable for the lifetime of the process and are not
/// persisted across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId(String);

impl ConversationId {
    /// Conversation scope for a private chat with `username`.
    pub fn for_user(username: &str) -> Self {
        Self(format!("user:{username}"))
    }

    /// Conversation scope for the channel with id `channel_id`.
    pub fn for_channel(channel_id: u32) -> Self {
        Self(format!("channel:{channel_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
