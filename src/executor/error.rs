//! Request pipeline error types.
//!
//! Every error here is fatal to the request it belongs to: the caller gets it
//! back and no audit record is written. Best-effort failures (header merge,
//! log persistence) never surface as a `RequestError`; they go to the
//! diagnostics sink instead.

use thiserror::Error;

/// Boxed transport-level cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning a relative URL into an absolute one
    Resolve,
    /// Validating and canonicalizing the request body
    Normalize,
    /// Building, sending and reading the exchange
    Execute,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::Normalize => "normalize",
            Stage::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// Errors that abort a request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The URL is relative and no environment is active.
    #[error("failed to resolve URL: no active environment found")]
    NoActiveEnvironment,

    /// The body declares JSON but does not parse.
    #[error("invalid JSON body: {0}")]
    InvalidJsonBody(#[source] serde_json::Error),

    /// The request could not be constructed (bad method or header).
    #[error("failed to create request: {0}")]
    InvalidRequest(String),

    /// DNS, connect, TLS or timeout failure while sending.
    #[error("failed to send request: {0}")]
    RequestFailed(#[source] BoxError),

    /// The response body stream failed after headers were received.
    #[error("failed to read response body: {0}")]
    ResponseReadFailed(#[source] BoxError),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl RequestError {
    /// Returns the pipeline stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            RequestError::NoActiveEnvironment => Stage::Resolve,
            RequestError::InvalidJsonBody(_) => Stage::Normalize,
            RequestError::InvalidRequest(_)
            | RequestError::RequestFailed(_)
            | RequestError::ResponseReadFailed(_)
            | RequestError::Cancelled => Stage::Execute,
        }
    }

    /// Whether the network was (or may have been) contacted before failing.
    pub fn after_network_io(&self) -> bool {
        matches!(
            self,
            RequestError::RequestFailed(_) | RequestError::ResponseReadFailed(_)
        )
    }

    /// Whether the underlying cause is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            RequestError::RequestFailed(cause) | RequestError::ResponseReadFailed(cause) => cause
                .downcast_ref::<reqwest::Error>()
                .map_or(false, |err| err.is_timeout()),
            _ => false,
        }
    }
}
