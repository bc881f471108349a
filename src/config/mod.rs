//! Configuration loading for the exchange client.
//!
//! Settings are read from a JSON value (under the `"api-exchange"` key) or a
//! JSON settings file, merged over the defaults and validated. The resulting
//! [`ClientConfig`] is passed explicitly to the components that need it.

pub mod schema;

pub use schema::{ClientConfig, LOG_FILE_NAME};

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Settings key holding this client's configuration.
pub const SETTINGS_KEY: &str = "api-exchange";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Loads configuration from a settings JSON value.
///
/// Settings under [`SETTINGS_KEY`] are merged over the defaults. Settings that
/// fail to deserialize are logged and ignored; a merged result that fails
/// validation is an error.
///
/// # Example
///
/// ```
/// use api_exchange::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "api-exchange": {
///         "timeout": 60000,
///         "storageDir": "/tmp/api-exchange"
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 60000);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(settings) = settings_json {
        if let Some(client_settings) = settings.get(SETTINGS_KEY) {
            match serde_json::from_value::<ClientConfig>(client_settings.clone()) {
                Ok(user_config) => {
                    config = config.merge(&user_config);
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse {} settings: {}. Using defaults.",
                        SETTINGS_KEY,
                        e
                    );
                }
            }
        }
    }

    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// A missing file yields the defaults. Unlike [`load_config`], a file that is
/// not valid JSON is an error, since the caller named it explicitly.
pub fn load_config_file(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.exists() {
        log::debug!("No settings file at {}, using defaults", path.display());
        return load_config(None);
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Value = serde_json::from_str(&content)?;
    load_config(Some(settings))
}
