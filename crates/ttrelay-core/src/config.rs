//! Bot configuration model.
//!
//! The settings file holds both the chat-server account and the
//! per-provider API credentials. Loading and saving lives in the
//! infrastructure layer; this module only defines the shape.

use serde::{Deserialize, Serialize};

/// Credentials and model selection for a single AI provider.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    /// API key; an empty key disables the provider.
    #[serde(default)]
    pub api_key: String,
    /// Model name; `None` falls back to the provider's default.
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderSettings {
    /// A provider is usable only when a key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Top-level bot settings, persisted as JSON.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub nickname: String,
    /// Channel to join on login, e.g. "/".
    pub channel: String,
    #[serde(default)]
    pub channel_password: String,

    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub deepseek: ProviderSettings,
    #[serde(default)]
    pub groq: ProviderSettings,

    /// Maximum tokens requested per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Rolling history cap per (conversation, backend) pair.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Transport per-message size limit, in characters.
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,
    /// Prefix required on channel messages addressed to the bot.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// When true, only users in the bot's channel may talk to it.
    #[serde(default = "default_channel_only")]
    pub channel_only: bool,
}

fn default_max_tokens() -> u32 {
    200
}

fn default_history_limit() -> usize {
    30
}

fn default_message_limit() -> usize {
    250
}

fn default_command_prefix() -> String {
    "/".to_string()
}

fn default_channel_only() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 10333,
            username: String::new(),
            password: String::new(),
            nickname: String::new(),
            channel: "/".to_string(),
            channel_password: String::new(),
            openai: ProviderSettings::default(),
            deepseek: ProviderSettings::default(),
            groq: ProviderSettings::default(),
            max_tokens: default_max_tokens(),
            history_limit: default_history_limit(),
            message_limit: default_message_limit(),
            command_prefix: default_command_prefix(),
            channel_only: default_channel_only(),
        }
    }
}
