//! Bounded rolling history store.

use super::id::ConversationId;
use super::message::{MessageRole, Turn};
use crate::provider::Backend;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type Key = (ConversationId, Backend);

/// Holds, per (conversation, backend) pair, a bounded ordered sequence of
/// turns, newest at the end.
///
/// Concurrency contract: calls for different keys never block each other;
/// calls for the same key are serialized so no turn is lost and histories
/// never interleave. The outer map lock is held only long enough to find
/// or create the per-key entry; the per-key mutex guards the actual turns.
///
/// A history entry exists only for pairs that have exchanged at least one
/// message since last cleared; clearing removes the entry entirely.
pub struct ConversationStore {
    histories: RwLock<HashMap<Key, Arc<Mutex<Vec<Turn>>>>>,
    limit: usize,
}

impl ConversationStore {
    /// Creates a store with the given per-history cap.
    pub fn new(limit: usize) -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
            limit,
        }
    }

    /// The per-history turn cap.
    pub fn limit(&self) -> usize {
        self.limit
    }

    async fn entry(&self, id: &ConversationId, backend: Backend) -> Arc<Mutex<Vec<Turn>>> {
        let key = (id.clone(), backend);
        {
            let histories = self.histories.read().await;
            if let Some(entry) = histories.get(&key) {
                return entry.clone();
            }
        }
        let mut histories = self.histories.write().await;
        histories
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Appends a turn, evicting the oldest turn first when the history is
    /// already at the cap. Creates the history entry if absent.
    pub async fn append(&self, id: &ConversationId, backend: Backend, turn: Turn) {
        let entry = self.entry(id, backend).await;
        let mut turns = entry.lock().await;
        if turns.len() >= self.limit {
            turns.remove(0);
        }
        turns.push(turn);
    }

    /// Returns a snapshot of the history, empty if no entry exists.
    pub async fn get(&self, id: &ConversationId, backend: Backend) -> Vec<Turn> {
        let key = (id.clone(), backend);
        let entry = {
            let histories = self.histories.read().await;
            histories.get(&key).cloned()
        };
        match entry {
            Some(entry) => entry.lock().await.clone(),
            None => Vec::new(),
        }
    }

    /// Whether a history entry exists for the pair.
    pub async fn exists(&self, id: &ConversationId, backend: Backend) -> bool {
        let histories = self.histories.read().await;
        histories.contains_key(&(id.clone(), backend))
    }

    /// Removes the history entry entirely. Returns whether one existed.
    pub async fn clear(&self, id: &ConversationId, backend: Backend) -> bool {
        let mut histories = self.histories.write().await;
        histories.remove(&(id.clone(), backend)).is_some()
    }

    /// Removes the most recent user turn matching `content`, if it is still
    /// present. Used to roll back the request turn after a failed provider
    /// call so history only grows on successful exchanges.
    pub async fn retract_user_turn(&self, id: &ConversationId, backend: Backend, content: &str) {
        let key = (id.clone(), backend);
        let entry = {
            let histories = self.histories.read().await;
            histories.get(&key).cloned()
        };
        let Some(entry) = entry else { return };
        let mut turns = entry.lock().await;
        if let Some(pos) = turns
            .iter()
            .rposition(|t| t.role == MessageRole::User && t.content == content)
        {
            turns.remove(pos);
        }
        // Drop the entry when the rollback emptied it, so a failed first
        // exchange does not leave a zero-length history behind.
        if turns.is_empty() {
            drop(turns);
            let mut histories = self.histories.write().await;
            if let Some(existing) = histories.get(&key) {
                if existing.try_lock().map(|t| t.is_empty()).unwrap_or(false) {
                    histories.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> ConversationId {
        ConversationId::for_user("alice")
    }

    #[tokio::test]
    async fn append_caps_history_fifo() {
        let store = ConversationStore::new(5);
        for i in 0..7 {
            store
                .append(&alice(), Backend::OpenAi, Turn::user(format!("m{i}")))
                .await;
        }
        let history = store.get(&alice(), Backend::OpenAi).await;
        assert_eq!(history.len(), 5);
        // Oldest two (m0, m1) evicted, order preserved.
        assert_eq!(history[0].content, "m2");
        assert_eq!(history[4].content, "m6");
    }

    #[tokio::test]
    async fn nth_plus_one_append_drops_exactly_the_oldest() {
        let store = ConversationStore::new(3);
        for i in 0..3 {
            store
                .append(&alice(), Backend::Groq, Turn::user(format!("m{i}")))
                .await;
        }
        store
            .append(&alice(), Backend::Groq, Turn::user("m3"))
            .await;
        let history = store.get(&alice(), Backend::Groq).await;
        assert_eq!(
            history.iter().map(|t| t.content.as_str()).collect::<Vec<_>>(),
            vec!["m1", "m2", "m3"]
        );
    }

    #[tokio::test]
    async fn histories_are_scoped_per_backend() {
        let store = ConversationStore::new(30);
        store
            .append(&alice(), Backend::OpenAi, Turn::user("to openai"))
            .await;
        assert!(store.exists(&alice(), Backend::OpenAi).await);
        assert!(!store.exists(&alice(), Backend::Groq).await);
        assert!(store.get(&alice(), Backend::Groq).await.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_entry_entirely() {
        let store = ConversationStore::new(30);
        store
            .append(&alice(), Backend::OpenAi, Turn::user("hello"))
            .await;
        assert!(store.clear(&alice(), Backend::OpenAi).await);
        assert!(!store.exists(&alice(), Backend::OpenAi).await);
        assert!(store.get(&alice(), Backend::OpenAi).await.is_empty());
        // Second clear has nothing to remove.
        assert!(!store.clear(&alice(), Backend::OpenAi).await);
    }

    #[tokio::test]
    async fn retract_removes_matching_user_turn_and_empty_entry() {
        let store = ConversationStore::new(30);
        store
            .append(&alice(), Backend::OpenAi, Turn::user("failed request"))
            .await;
        store
            .retract_user_turn(&alice(), Backend::OpenAi, "failed request")
            .await;
        assert!(!store.exists(&alice(), Backend::OpenAi).await);
    }

    #[tokio::test]
    async fn retract_leaves_other_turns_in_place() {
        let store = ConversationStore::new(30);
        store
            .append(&alice(), Backend::OpenAi, Turn::user("hello"))
            .await;
        store
            .append(&alice(), Backend::OpenAi, Turn::assistant("hi there"))
            .await;
        store
            .append(&alice(), Backend::OpenAi, Turn::user("failed request"))
            .await;
        store
            .retract_user_turn(&alice(), Backend::OpenAi, "failed request")
            .await;
        let history = store.get(&alice(), Backend::OpenAi).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, "hi there");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_to_same_key_lose_nothing() {
        let store = Arc::new(ConversationStore::new(100));
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&alice(), Backend::DeepSeek, Turn::user(format!("m{i}")))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let history = store.get(&alice(), Backend::DeepSeek).await;
        assert_eq!(history.len(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_respect_cap() {
        let store = Arc::new(ConversationStore::new(10));
        let mut handles = Vec::new();
        for i in 0..40 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(&alice(), Backend::OpenAi, Turn::user(format!("m{i}")))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.get(&alice(), Backend::OpenAi).await.len(), 10);
    }
}
