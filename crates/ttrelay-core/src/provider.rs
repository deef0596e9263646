//! Provider abstraction.
//!
//! Each AI backend exposes a single `complete` capability over the
//! conversation history; the HTTP details live in `ttrelay-interaction`.

use crate::conversation::Turn;
use async_trait::async_trait;
use strum::Display;
use thiserror::Error;

/// The set of supported AI backends.
///
/// Declaration order defines the menu numbering users see: backend k is
/// selected with the digit k and cleared with the digit k + K, where K is
/// the number of backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Backend {
    #[strum(serialize = "ChatGPT")]
    OpenAi,
    #[strum(serialize = "DeepSeek")]
    DeepSeek,
    #[strum(serialize = "Groq")]
    Groq,
}

impl Backend {
    /// All backends in menu order.
    pub fn all() -> &'static [Backend] {
        &[Backend::OpenAi, Backend::DeepSeek, Backend::Groq]
    }

    /// Menu index of the backend, 1-based.
    pub fn menu_index(self) -> usize {
        Backend::all()
            .iter()
            .position(|b| *b == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Looks up a backend by its 1-based menu index.
    pub fn from_menu_index(index: usize) -> Option<Backend> {
        if index == 0 {
            return None;
        }
        Backend::all().get(index - 1).copied()
    }
}

/// Typed failure categories for a provider call.
///
/// Each variant maps to a distinct user-facing reply; none of them may
/// escape the router as an unhandled fault.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No network reachability to the provider (includes request timeout).
    #[error("Connection to {backend} failed: {message}")]
    Connectivity { backend: Backend, message: String },

    /// Provider reachable but returned a non-success status or error payload.
    #[error("{backend} returned status {status}: {message}")]
    Provider {
        backend: Backend,
        status: u16,
        message: String,
    },

    /// 2xx response with no completion choices or empty content.
    #[error("{backend} returned an empty response")]
    EmptyResponse { backend: Backend },

    /// Any other unexpected fault during the call.
    #[error("Unexpected {backend} failure: {message}")]
    Unknown { backend: Backend, message: String },
}

impl ProviderError {
    /// The backend the failed call was addressed to.
    pub fn backend(&self) -> Backend {
        match self {
            ProviderError::Connectivity { backend, .. }
            | ProviderError::Provider { backend, .. }
            | ProviderError::EmptyResponse { backend }
            | ProviderError::Unknown { backend, .. } => *backend,
        }
    }

    /// Converts the failure into the reply text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Connectivity { backend, .. } => {
                format!("Could not reach {backend}. Check the bot's internet connection and try again.")
            }
            ProviderError::Provider {
                backend,
                status,
                message,
            } => format!("{backend} error {status}: {message}"),
            ProviderError::EmptyResponse { backend } => {
                format!("{backend} sent back an empty answer. Please try again.")
            }
            ProviderError::Unknown { backend, message } => {
                format!("Unexpected error while talking to {backend}: {message}")
            }
        }
    }
}

/// A chat-completion client for one backend.
///
/// Stateless per call: implementations own only network and auth
/// configuration. The full bounded history is sent on every call.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The backend this client talks to.
    fn backend(&self) -> Backend;

    /// Requests one completion for the given history.
    async fn complete(&self, history: &[Turn]) -> Result<String, ProviderError>;
}
