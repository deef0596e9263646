//! DeepSeek client.
//!
//! DeepSeek exposes an OpenAI-compatible chat-completions endpoint, so
//! only the base URL and default model differ.

use crate::wire::{self, ChatCompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use ttrelay_core::conversation::Turn;
use ttrelay_core::provider::{Backend, ProviderClient, ProviderError};

const BASE_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "deepseek-chat";

/// Client for the DeepSeek chat-completions API.
#[derive(Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: Option<u32>,
}

impl DeepSeekClient {
    /// Creates a client with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: wire::http_client(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[async_trait]
impl ProviderClient for DeepSeekClient {
    fn backend(&self) -> Backend {
        Backend::DeepSeek
    }

    async fn complete(&self, history: &[Turn]) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: history,
            max_tokens: self.max_tokens,
        };
        wire::post_chat(
            &self.client,
            BASE_URL,
            &self.api_key,
            Backend::DeepSeek,
            &request,
        )
        .await
    }
}
