//! Environment file loader.
//!
//! Reads the `environments.json` array kept by the host application. Only
//! reading happens here; the host owns creating and editing environments.

use super::models::Environments;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default environments file name inside the storage root.
pub const ENVIRONMENTS_FILE_NAME: &str = "environments.json";

/// Errors that can occur while loading or selecting environments.
#[derive(Debug, Error)]
pub enum EnvError {
    /// IO error occurred while reading the file
    #[error("failed to read environments file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid JSON array of environments
    #[error("failed to parse environments file: {0}")]
    Parse(#[from] serde_json::Error),

    /// No environment with the given id exists
    #[error("environment with ID {0} not found")]
    NotFound(String),

    /// The shared environment state is unusable
    #[error("environment state unavailable: {0}")]
    Unavailable(String),
}

/// Loads environments from `path`.
///
/// # Returns
///
/// * `Ok(Environments::defaults())` when the file does not exist
/// * `Ok(Environments)` with exactly one active entry (the first one is
///   activated when the file flags none)
/// * `Err(EnvError)` when the file exists but cannot be read or parsed
///
/// A file that does not parse is an error rather than a silent fall back to
/// the defaults, so a broken file is never mistaken for a fresh install.
pub fn load_environments(path: &Path) -> Result<Environments, EnvError> {
    if !path.exists() {
        log::debug!(
            "No environments file at {}, using defaults",
            path.display()
        );
        return Ok(Environments::defaults());
    }

    let content = fs::read_to_string(path)?;
    let mut environments: Environments = serde_json::from_str(&content)?;

    if environments.ensure_active() {
        log::info!(
            "No active environment in {}, activated the first entry",
            path.display()
        );
    }

    Ok(environments)
}
