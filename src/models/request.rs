//! Outbound exchange request model.
//!
//! This module defines the request handed to the pipeline by a caller,
//! together with the fixed set of HTTP methods the client offers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP methods offered to callers of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    /// Every supported method, in the order shown to users.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
        HttpMethod::HEAD,
        HttpMethod::OPTIONS,
    ];

    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// Parses a method name case-insensitively.
    ///
    /// Returns `None` for anything outside the supported set.
    pub fn parse(s: &str) -> Option<Self> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the names of the methods the client supports.
pub fn supported_methods() -> Vec<String> {
    HttpMethod::ALL
        .iter()
        .map(|method| method.as_str().to_string())
        .collect()
}

/// A request as submitted by a caller.
///
/// The method is kept as a raw string so callers may send any token the
/// transport accepts; [`HttpMethod`] only describes what the UI offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,

    /// Target URL, absolute or relative to the active environment.
    pub url: String,

    /// Request headers. Keys are case-sensitive as supplied.
    #[serde(default, deserialize_with = "headers_or_empty")]
    pub headers: HashMap<String, String>,

    /// Raw body text. Empty means no body.
    #[serde(default)]
    pub body: String,

    /// Scope used to look up header templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

impl ExchangeRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            body: String::new(),
            collection_id: None,
        }
    }

    /// Adds a header, replacing any previous value under the same key.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the header-template scope.
    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    /// Checks if the request has a non-empty body.
    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Gets the Content-Type header value, matching the name case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        content_type_of(&self.headers)
    }
}

/// Finds the Content-Type value in a header map regardless of key casing.
pub fn content_type_of(headers: &HashMap<String, String>) -> Option<&str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.as_str())
}

/// Deserializes a header map, reading `null` as no headers.
pub(crate) fn headers_or_empty<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<HashMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}
