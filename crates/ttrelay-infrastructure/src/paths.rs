//! Well-known filesystem locations.

use std::path::PathBuf;
use ttrelay_core::error::{RelayError, Result};

/// Resolves the paths the relay uses on disk.
pub struct RelayPaths;

impl RelayPaths {
    /// Configuration directory: `~/.config/ttrelay`.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("ttrelay"))
            .ok_or_else(|| RelayError::config("could not determine the config directory"))
    }

    /// Settings file: `~/.config/ttrelay/settings.json`.
    ///
    /// Holds the chat-server account and the provider API keys, so it
    /// should be readable by the bot's user only.
    pub fn settings_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.json"))
    }
}
