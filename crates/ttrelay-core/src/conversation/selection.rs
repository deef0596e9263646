//! Backend selection per conversation.

use super::id::ConversationId;
use crate::provider::Backend;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Maps each conversation to the backend it is currently bound to.
///
/// Absence of an entry means no backend has been selected yet. An entry is
/// created on the first selection command, overwritten on re-selection and
/// never expires on its own; it lives for the process lifetime.
#[derive(Default)]
pub struct ChatSelection {
    selected: RwLock<HashMap<ConversationId, Backend>>,
}

impl ChatSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the conversation to `backend`, replacing any previous binding.
    pub async fn select(&self, id: &ConversationId, backend: Backend) {
        let mut selected = self.selected.write().await;
        selected.insert(id.clone(), backend);
    }

    /// The backend currently bound to the conversation, if any.
    pub async fn get(&self, id: &ConversationId) -> Option<Backend> {
        let selected = self.selected.read().await;
        selected.get(id).copied()
    }

    /// Unbinds the conversation if it currently points at `backend`.
    ///
    /// Used when a user clears a backend's history: a cleared backend should
    /// not silently keep receiving the conversation's free text.
    pub async fn unselect_if(&self, id: &ConversationId, backend: Backend) {
        let mut selected = self.selected.write().await;
        if selected.get(id) == Some(&backend) {
            selected.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn select_overwrites_previous_binding() {
        let selection = ChatSelection::new();
        let id = ConversationId::for_user("alice");
        assert_eq!(selection.get(&id).await, None);

        selection.select(&id, Backend::OpenAi).await;
        assert_eq!(selection.get(&id).await, Some(Backend::OpenAi));

        selection.select(&id, Backend::Groq).await;
        assert_eq!(selection.get(&id).await, Some(Backend::Groq));
    }

    #[tokio::test]
    async fn unselect_if_only_matches_bound_backend() {
        let selection = ChatSelection::new();
        let id = ConversationId::for_user("alice");
        selection.select(&id, Backend::Groq).await;

        selection.unselect_if(&id, Backend::OpenAi).await;
        assert_eq!(selection.get(&id).await, Some(Backend::Groq));

        selection.unselect_if(&id, Backend::Groq).await;
        assert_eq!(selection.get(&id).await, None);
    }
}
