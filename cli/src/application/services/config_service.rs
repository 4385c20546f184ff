//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{ZcpConfig, validate_config_key, validate_config_value};

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(store: &impl ConfigStore) -> Result<ZcpConfig> {
    store.load()
}

/// Validates and persists one dotted setting, returning the updated config.
///
/// # Errors
///
/// [`crate::domain::ConfigError`] for an unknown key or a bad value, or a
/// load/save failure.
pub fn set_config_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<ZcpConfig> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    Ok(config)
}
