//! Provider client implementations.
//!
//! Each backend gets a thin REST client for its chat-completions API. All
//! three APIs speak the OpenAI-compatible wire shape, so the request and
//! response bodies plus the error mapping are shared in the `wire` module;
//! the per-provider modules carry only endpoint, defaults and construction.

mod deepseek;
mod groq;
mod openai;
mod wire;

pub use deepseek::DeepSeekClient;
pub use groq::GroqClient;
pub use openai::OpenAiClient;
