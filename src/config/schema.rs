//! Configuration schema for the exchange client.
//!
//! This module defines the configuration structure and validation logic for
//! the user-configurable settings of the request pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the audit log file inside `<storageDir>/logs`.
pub const LOG_FILE_NAME: &str = "request_logs.json";

/// Main configuration structure for the exchange client.
///
/// Missing settings fall back to defaults field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Request timeout in milliseconds.
    ///
    /// Bounds connect, send and body download together. Defaults to 30000ms.
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether to automatically follow HTTP redirects. Defaults to true.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow when `follow_redirects` is set.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Headers sent with every request unless the request sets the same key.
    #[serde(default = "default_headers")]
    pub default_headers: HashMap<String, String>,

    /// Root directory for persisted state.
    ///
    /// The audit log lives at `<storageDir>/logs/request_logs.json`.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            default_headers: default_headers(),
            storage_dir: default_storage_dir(),
        }
    }
}

impl ClientConfig {
    /// Creates the default configuration rooted at `storage_dir`.
    pub fn with_storage_dir(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            ..Self::default()
        }
    }

    /// Validates the configuration and returns errors if any settings are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err("storageDir must not be empty".to_string());
        }

        if let Some(name) = self.default_headers.keys().find(|k| k.trim().is_empty()) {
            return Err(format!("defaultHeaders contains an empty header name: '{}'", name));
        }

        Ok(())
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// Directory holding the audit log file.
    pub fn logs_dir(&self) -> PathBuf {
        self.storage_dir.join("logs")
    }

    /// Full path of the audit log file.
    pub fn log_file_path(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    /// Merges this configuration with another, using values from `other`.
    ///
    /// Default headers are combined, with `other` winning on the same key.
    pub fn merge(&self, other: &ClientConfig) -> Self {
        let mut default_headers = self.default_headers.clone();
        default_headers.extend(other.default_headers.clone());

        Self {
            timeout: other.timeout,
            follow_redirects: other.follow_redirects,
            max_redirects: other.max_redirects,
            default_headers,
            storage_dir: other.storage_dir.clone(),
        }
    }
}

// Default value functions for serde

fn default_timeout() -> u64 {
    30000 // 30 seconds in milliseconds
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_headers() -> HashMap<String, String> {
    let mut headers = HashMap::new();
    headers.insert(
        "User-Agent".to_string(),
        format!("api-exchange/{}", env!("CARGO_PKG_VERSION")),
    );
    headers
}

/// `$HOME/.api-exchange`, or `%USERPROFILE%\.api-exchange` on Windows.
///
/// Falls back to a relative `.api-exchange` when neither is set.
fn default_storage_dir() -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    match home {
        Some(home) => PathBuf::from(home).join(".api-exchange"),
        None => PathBuf::from(".api-exchange"),
    }
}
