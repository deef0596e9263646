//! Infrastructure layer: settings persistence.

mod paths;
mod settings_storage;

pub use paths::RelayPaths;
pub use settings_storage::SettingsStorage;
