use anyhow::Result;
use ttrelay_infrastructure::SettingsStorage;

/// Writes the default settings template for first-time setup.
pub fn run() -> Result<()> {
    let storage = SettingsStorage::new()?;
    storage.init_default()?;
    println!("Wrote default settings to {}", storage.path().display());
    println!("Fill in the server account and at least one provider api_key, then run `ttrelay run`.");
    Ok(())
}
