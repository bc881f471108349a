//! Environment management and relative URL resolution.
//!
//! Requests may name a path such as `/v1/users` instead of a full URL. Such
//! URLs are joined onto the base URL of the active environment, which is
//! supplied by an [`ActiveEnvironment`] collaborator.
//!
//! # Example
//!
//! ```
//! use api_exchange::environment::{resolve_url, Environments, EnvironmentSession};
//!
//! let session = EnvironmentSession::new(Environments::defaults());
//! session.set_active_environment("production").unwrap();
//!
//! let url = resolve_url("/v1/users", &session).unwrap();
//! assert_eq!(url, "https://api.example.com/v1/users");
//! ```

pub mod loader;
pub mod models;

use crate::executor::RequestError;
use std::sync::{Arc, RwLock};

pub use loader::{load_environments, EnvError, ENVIRONMENTS_FILE_NAME};
pub use models::{Environment, Environments};

/// Supplies the base URL of the currently active environment.
pub trait ActiveEnvironment: Send + Sync {
    /// Returns the active base URL, or `None` when no environment is active
    /// or the active one cannot be determined.
    fn active_base_url(&self) -> Option<String>;
}

impl<F> ActiveEnvironment for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn active_base_url(&self) -> Option<String> {
        self()
    }
}

/// Resolves `url` into an absolute URL.
///
/// URLs starting with `http://` or `https://` are returned unchanged without
/// consulting `environment`. Otherwise exactly one trailing slash is removed
/// from the base URL and exactly one leading slash from `url`, and the two are
/// joined with a single `/`.
///
/// # Errors
///
/// [`RequestError::NoActiveEnvironment`] when the URL is relative and no
/// environment is active.
pub fn resolve_url(url: &str, environment: &dyn ActiveEnvironment) -> Result<String, RequestError> {
    if is_absolute(url) {
        return Ok(url.to_string());
    }

    let base_url = environment
        .active_base_url()
        .ok_or(RequestError::NoActiveEnvironment)?;

    let base = base_url.strip_suffix('/').unwrap_or(&base_url);
    let path = url.strip_prefix('/').unwrap_or(url);

    Ok(format!("{}/{}", base, path))
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Shared, thread-safe view of the loaded environments.
///
/// Cloning the session shares the same underlying state.
#[derive(Debug, Clone)]
pub struct EnvironmentSession {
    environments: Arc<RwLock<Environments>>,
}

impl EnvironmentSession {
    /// Creates a new environment session with the given environments
    pub fn new(environments: Environments) -> Self {
        Self {
            environments: Arc::new(RwLock::new(environments)),
        }
    }

    /// Gets a copy of the currently active environment
    pub fn get_active_environment(&self) -> Option<Environment> {
        self.environments
            .read()
            .ok()
            .and_then(|envs| envs.get_active().cloned())
    }

    /// Activates the environment with the given id, deactivating all others.
    pub fn set_active_environment(&self, id: &str) -> Result<(), EnvError> {
        let mut envs = self
            .environments
            .write()
            .map_err(|_| EnvError::Unavailable("environment lock poisoned".to_string()))?;

        if envs.set_active(id) {
            log::debug!("Active environment set to '{}'", id);
            Ok(())
        } else {
            Err(EnvError::NotFound(id.to_string()))
        }
    }

    /// Replaces all environments, e.g. after the host reloaded its file.
    pub fn reload_environments(&self, new_environments: Environments) -> Result<(), EnvError> {
        let mut envs = self
            .environments
            .write()
            .map_err(|_| EnvError::Unavailable("environment lock poisoned".to_string()))?;

        *envs = new_environments;
        Ok(())
    }

    /// Gets a snapshot of all environments
    pub fn get_environments(&self) -> Option<Environments> {
        self.environments.read().ok().map(|envs| envs.clone())
    }
}

impl ActiveEnvironment for EnvironmentSession {
    fn active_base_url(&self) -> Option<String> {
        self.get_active_environment().map(|env| env.base_url)
    }
}
