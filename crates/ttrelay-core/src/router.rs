//! Command interpretation and conversation routing.
//!
//! The router owns the two pieces of shared session state (history store
//! and backend selection) and decides, per inbound message, whether to
//! answer locally (help, select, clear) or forward the text to the
//! conversation's bound AI backend.

use crate::conversation::{ChatSelection, ConversationId, ConversationStore, Turn};
use crate::provider::{Backend, ProviderClient};
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of routing one inbound message.
///
/// `Reply` carries an answer produced synchronously from local state.
/// `Completion` means the message is free text bound for an AI backend and
/// should be completed on its own task (the provider call blocks for
/// network time).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Reply(String),
    Completion(Backend),
}

/// Routes inbound messages to control commands or AI completions.
pub struct Router {
    store: Arc<ConversationStore>,
    selection: ChatSelection,
    providers: HashMap<Backend, Arc<dyn ProviderClient>>,
    help_text: String,
}

impl Router {
    /// Creates a router over the given providers.
    ///
    /// `command_prefix` only appears in the help text; prefix stripping is
    /// the dispatcher's job.
    pub fn new(
        store: Arc<ConversationStore>,
        providers: Vec<Arc<dyn ProviderClient>>,
        command_prefix: &str,
    ) -> Self {
        let providers: HashMap<Backend, Arc<dyn ProviderClient>> = providers
            .into_iter()
            .map(|p| (p.backend(), p))
            .collect();
        let help_text = build_help_text(command_prefix);
        Self {
            store,
            selection: ChatSelection::new(),
            providers,
            help_text,
        }
    }

    /// The command list shown to users.
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    /// Interprets one message for the conversation.
    ///
    /// Control commands mutate selection/history state inline and produce a
    /// `Reply`; free text with a bound backend produces a `Completion` to be
    /// finished via [`Router::complete`]. Anything else gets the help text.
    pub async fn route(&self, conversation: &ConversationId, raw: &str) -> RouteDecision {
        let message = raw.trim();

        if message.is_empty() || message.eq_ignore_ascii_case("h") {
            return RouteDecision::Reply(self.help_text.clone());
        }

        let backend_count = Backend::all().len();
        if let Some(number) = parse_menu_number(message) {
            if let Some(backend) = Backend::from_menu_index(number) {
                return RouteDecision::Reply(self.select_backend(conversation, backend).await);
            }
            if let Some(backend) = Backend::from_menu_index(number.wrapping_sub(backend_count)) {
                return RouteDecision::Reply(self.clear_backend(conversation, backend).await);
            }
            // Out-of-range numbers fall through and are treated as text.
        }

        match self.selection.get(conversation).await {
            Some(backend) => RouteDecision::Completion(backend),
            None => RouteDecision::Reply(self.help_text.clone()),
        }
    }

    async fn select_backend(&self, conversation: &ConversationId, backend: Backend) -> String {
        self.selection.select(conversation, backend).await;
        if self.store.exists(conversation, backend).await {
            format!("Resuming your previous conversation with {backend}.")
        } else {
            format!("Started a new conversation with {backend}.")
        }
    }

    async fn clear_backend(&self, conversation: &ConversationId, backend: Backend) -> String {
        // A cleared backend must not keep receiving the conversation's
        // free text, so the selection goes too.
        self.selection.unselect_if(conversation, backend).await;
        if self.store.clear(conversation, backend).await {
            format!("Your previous conversation with {backend} was cleared.")
        } else {
            format!("You have no conversation with {backend} to clear.")
        }
    }

    /// Completes one free-text exchange against `backend`.
    ///
    /// Appends the user turn, sends the full bounded history to the
    /// provider and appends the assistant turn on success. On failure the
    /// user turn is rolled back (history only grows on successful
    /// exchanges) and the failure's user-facing text is returned. This
    /// never panics and never surfaces an error to the caller.
    pub async fn complete(
        &self,
        conversation: &ConversationId,
        backend: Backend,
        text: &str,
    ) -> String {
        let Some(provider) = self.providers.get(&backend) else {
            return format!("{backend} is not configured on this bot.");
        };

        self.store
            .append(conversation, backend, Turn::user(text))
            .await;
        let history = self.store.get(conversation, backend).await;

        match provider.complete(&history).await {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                self.store
                    .append(conversation, backend, Turn::assistant(answer.clone()))
                    .await;
                answer
            }
            Err(err) => {
                tracing::warn!(
                    backend = %backend,
                    conversation = %conversation,
                    error = %err,
                    "provider call failed"
                );
                self.store.retract_user_turn(conversation, backend, text).await;
                err.user_message()
            }
        }
    }
}

/// Parses a trimmed token made entirely of digit glyphs into a number.
///
/// Accepts ASCII digits alongside Persian (U+06F0..U+06F9) and
/// Arabic-Indic (U+0660..U+0669) numerals so users on localized keyboard
/// layouts can use the menu without switching layouts.
fn parse_menu_number(token: &str) -> Option<usize> {
    if token.is_empty() {
        return None;
    }
    let mut value: usize = 0;
    for ch in token.chars() {
        let digit = digit_value(ch)?;
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    Some(value)
}

fn digit_value(ch: char) -> Option<usize> {
    match ch {
        '0'..='9' => Some(ch as usize - '0' as usize),
        '\u{06F0}'..='\u{06F9}' => Some(ch as usize - 0x06F0),
        '\u{0660}'..='\u{0669}' => Some(ch as usize - 0x0660),
        _ => None,
    }
}

fn build_help_text(command_prefix: &str) -> String {
    let backends = Backend::all();
    let mut text = String::from(
        "Send the letter h (or an empty message) for this help, or one of the numbers below.\n",
    );
    text.push_str(&format!(
        "In a channel, put \"{command_prefix}\" in front of every command.\n"
    ));
    for backend in backends {
        text.push_str(&format!(
            "{}. Start or resume a conversation with {}.\n",
            backend.menu_index(),
            backend
        ));
    }
    for backend in backends {
        text.push_str(&format!(
            "{}. Clear your previous conversation with {}.\n",
            backend.menu_index() + backends.len(),
            backend
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderError, ProviderClient};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted provider: pops the next canned outcome per call.
    struct MockProvider {
        backend: Backend,
        outcomes: Mutex<Vec<Result<String, ProviderError>>>,
        calls: Mutex<Vec<Vec<Turn>>>,
    }

    impl MockProvider {
        fn new(backend: Backend, outcomes: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                backend,
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProviderClient for MockProvider {
        fn backend(&self) -> Backend {
            self.backend
        }

        async fn complete(&self, history: &[Turn]) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push(history.to_vec());
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("canned".to_string()))
        }
    }

    fn router_with(provider: Arc<MockProvider>) -> Router {
        let store = Arc::new(ConversationStore::new(30));
        let providers: Vec<Arc<dyn ProviderClient>> = vec![provider];
        Router::new(store, providers, "/")
    }

    fn alice() -> ConversationId {
        ConversationId::for_user("alice")
    }

    #[tokio::test]
    async fn help_trigger_returns_help_without_touching_state() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        for input in ["", "  ", "h", "H"] {
            let decision = router.route(&alice(), input).await;
            assert_eq!(decision, RouteDecision::Reply(router.help_text().to_string()));
        }
        // No selection was created: free text still yields help.
        let decision = router.route(&alice(), "hello").await;
        assert_eq!(decision, RouteDecision::Reply(router.help_text().to_string()));
    }

    #[tokio::test]
    async fn help_text_documents_every_menu_entry() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);
        let help = router.help_text();
        for backend in Backend::all() {
            assert!(help.contains(&backend.to_string()));
        }
        for number in 1..=Backend::all().len() * 2 {
            assert!(help.contains(&format!("{number}. ")));
        }
    }

    #[tokio::test]
    async fn selecting_fresh_backend_reports_new_conversation() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        let decision = router.route(&alice(), "1").await;
        let RouteDecision::Reply(reply) = decision else {
            panic!("expected reply")
        };
        assert_eq!(reply, "Started a new conversation with ChatGPT.");
    }

    #[tokio::test]
    async fn selecting_backend_with_history_reports_resume() {
        let provider =
            MockProvider::new(Backend::OpenAi, vec![Ok("hi there".to_string())]);
        let router = router_with(provider);

        router.route(&alice(), "1").await;
        let answer = router.complete(&alice(), Backend::OpenAi, "hello").await;
        assert_eq!(answer, "hi there");

        let decision = router.route(&alice(), "1").await;
        assert_eq!(
            decision,
            RouteDecision::Reply("Resuming your previous conversation with ChatGPT.".to_string())
        );
    }

    #[tokio::test]
    async fn persian_digits_select_the_same_backend() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        let decision = router.route(&alice(), "\u{06F1}").await;
        assert_eq!(
            decision,
            RouteDecision::Reply("Started a new conversation with ChatGPT.".to_string())
        );
        // Selection is live: free text now routes to the backend.
        let decision = router.route(&alice(), "hello").await;
        assert_eq!(decision, RouteDecision::Completion(Backend::OpenAi));
    }

    #[tokio::test]
    async fn free_text_routes_to_selected_backend() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        router.route(&alice(), "1").await;
        let decision = router.route(&alice(), "what is rust?").await;
        assert_eq!(decision, RouteDecision::Completion(Backend::OpenAi));
    }

    #[tokio::test]
    async fn successful_exchange_appends_both_turns() {
        let provider =
            MockProvider::new(Backend::OpenAi, vec![Ok("hi there".to_string())]);
        let router = router_with(provider.clone());

        router.route(&alice(), "1").await;
        let answer = router.complete(&alice(), Backend::OpenAi, "hello").await;
        assert_eq!(answer, "hi there");

        let history = router.store.get(&alice(), Backend::OpenAi).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::user("hello"));
        assert_eq!(history[1], Turn::assistant("hi there"));

        // The provider saw the user turn.
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![Turn::user("hello")]);
    }

    #[tokio::test]
    async fn connectivity_failure_leaves_history_unchanged() {
        let provider = MockProvider::new(
            Backend::OpenAi,
            vec![Err(ProviderError::Connectivity {
                backend: Backend::OpenAi,
                message: "connection refused".to_string(),
            })],
        );
        let router = router_with(provider);

        router.route(&alice(), "1").await;
        let answer = router.complete(&alice(), Backend::OpenAi, "hello").await;
        assert!(answer.contains("Could not reach ChatGPT"));
        assert!(!router.store.exists(&alice(), Backend::OpenAi).await);
    }

    #[tokio::test]
    async fn clear_with_history_removes_it_and_unbinds_selection() {
        let provider =
            MockProvider::new(Backend::OpenAi, vec![Ok("hi there".to_string())]);
        let router = router_with(provider);

        router.route(&alice(), "1").await;
        router.complete(&alice(), Backend::OpenAi, "hello").await;

        // Backend 1 is cleared with token K+1.
        let clear_token = (Backend::all().len() + 1).to_string();
        let decision = router.route(&alice(), &clear_token).await;
        assert_eq!(
            decision,
            RouteDecision::Reply(
                "Your previous conversation with ChatGPT was cleared.".to_string()
            )
        );
        assert!(router.store.get(&alice(), Backend::OpenAi).await.is_empty());

        // Selection is gone too: free text falls back to help.
        let decision = router.route(&alice(), "hello again").await;
        assert_eq!(decision, RouteDecision::Reply(router.help_text().to_string()));

        // Re-selecting is a new conversation again.
        let decision = router.route(&alice(), "1").await;
        assert_eq!(
            decision,
            RouteDecision::Reply("Started a new conversation with ChatGPT.".to_string())
        );
    }

    #[tokio::test]
    async fn clear_without_history_reports_nothing_to_clear() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        let clear_token = (Backend::all().len() + 1).to_string();
        let decision = router.route(&alice(), &clear_token).await;
        assert_eq!(
            decision,
            RouteDecision::Reply("You have no conversation with ChatGPT to clear.".to_string())
        );
    }

    #[tokio::test]
    async fn out_of_range_number_is_plain_text() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        router.route(&alice(), "1").await;
        let decision = router.route(&alice(), "99").await;
        assert_eq!(decision, RouteDecision::Completion(Backend::OpenAi));
    }

    #[tokio::test]
    async fn unconfigured_backend_reports_without_mutating_history() {
        let provider = MockProvider::new(Backend::OpenAi, vec![]);
        let router = router_with(provider);

        let answer = router.complete(&alice(), Backend::Groq, "hello").await;
        assert_eq!(answer, "Groq is not configured on this bot.");
        assert!(!router.store.exists(&alice(), Backend::Groq).await);
    }

    #[test]
    fn menu_number_parsing_covers_numeral_scripts() {
        assert_eq!(parse_menu_number("1"), Some(1));
        assert_eq!(parse_menu_number("\u{06F2}"), Some(2));
        assert_eq!(parse_menu_number("\u{0663}"), Some(3));
        assert_eq!(parse_menu_number("12"), Some(12));
        assert_eq!(parse_menu_number("1a"), None);
        assert_eq!(parse_menu_number("one"), None);
        assert_eq!(parse_menu_number(""), None);
    }
}
