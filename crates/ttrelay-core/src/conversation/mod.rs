//! Conversation domain module.
//!
//! # Module Structure
//!
//! - `id`: Conversation identity (`ConversationId`)
//! - `message`: Turn types (`MessageRole`, `Turn`)
//! - `store`: Bounded rolling history per (conversation, backend) pair
//! - `selection`: Which backend a conversation is currently bound to

mod id;
mod message;
mod selection;
mod store;

// Re-export public API
pub use id::ConversationId;
pub use message::{MessageRole, Turn};
pub use selection::ChatSelection;
pub use store::ConversationStore;
