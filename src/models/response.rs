//! Exchange response model.
//!
//! A response is produced once per completed exchange and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a response received from a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status_code: u16,

    /// Status line text, e.g. `"200 OK"`.
    pub status: String,

    /// Response headers. Repeated headers are joined with `", "`.
    pub headers: HashMap<String, String>,

    /// Response body decoded as text.
    pub body: String,

    /// Milliseconds from pipeline start until the body was fully read.
    pub duration: u64,

    /// Length of the raw response body in bytes.
    pub size: u64,
}

impl ExchangeResponse {
    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Checks if the response status indicates a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Checks if the response status indicates a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        super::request::content_type_of(&self.headers)
    }
}

/// Builds the status line text the way the client displays it.
///
/// Unknown codes fall back to the bare number.
pub fn status_text(status_code: u16, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("{} {}", status_code, reason),
        None => status_code.to_string(),
    }
}
