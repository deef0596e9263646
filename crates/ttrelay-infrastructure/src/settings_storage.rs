//! Settings file storage.
//!
//! Loads and saves the bot settings as JSON. Saves go through a temp file
//! and an atomic rename so a crash mid-write never leaves a truncated
//! settings file behind.

use crate::paths::RelayPaths;
use std::fs;
use std::path::PathBuf;
use ttrelay_core::config::Settings;
use ttrelay_core::error::{RelayError, Result};

/// Storage for the settings file (settings.json).
///
/// Responsibilities:
/// - Load settings.json from the config directory
/// - Write a default template for first-time setup
/// - Persist edited settings atomically
///
/// Secrets are stored as plaintext JSON; the file should carry 600
/// permissions. Keys never appear in error messages or logs.
pub struct SettingsStorage {
    path: PathBuf,
}

impl SettingsStorage {
    /// Creates a storage handle at the default path.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: RelayPaths::settings_file()?,
        })
    }

    /// Creates a storage handle at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The path of the settings file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Whether a settings file exists yet.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads and parses the settings file.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Err(RelayError::config(format!(
                "settings file not found at {}; run `ttrelay init` first",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Writes the settings atomically (temp file + rename).
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    /// Writes the default settings template for first-time setup.
    ///
    /// Refuses to overwrite an existing file.
    pub fn init_default(&self) -> Result<Settings> {
        if self.exists() {
            return Err(RelayError::config(format!(
                "settings file already exists at {}",
                self.path.display()
            )));
        }
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}
