//! Per-request execution settings.

use crate::config::ClientConfig;
use std::time::{Duration, Instant};

/// Timeout settings for a single exchange.
///
/// `timeout` bounds connect + send + body download. A caller `deadline`, when
/// set, can only shorten it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// End-to-end timeout. Defaults to 30 seconds.
    pub timeout: Duration,

    /// Absolute point in time after which the exchange must give up.
    pub deadline: Option<Instant>,
}

impl ExecutionConfig {
    /// Creates an ExecutionConfig with the given timeout and no deadline.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Creates an ExecutionConfig from the client configuration.
    pub fn from_client_config(config: &ClientConfig) -> Self {
        Self::new(config.timeout_duration())
    }

    /// Restricts the exchange to finish by `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Timeout to apply to an exchange starting at `now`.
    ///
    /// A deadline already in the past yields a zero timeout.
    pub fn effective_timeout(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => self.timeout.min(deadline.saturating_duration_since(now)),
            None => self.timeout,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
