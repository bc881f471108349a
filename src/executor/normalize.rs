//! JSON body validation and canonicalization.
//!
//! Bodies whose Content-Type declares JSON are parsed before anything is sent;
//! a body that does not parse aborts the request. Valid bodies are re-emitted
//! in compact form. Everything else passes through untouched.

use super::error::RequestError;
use crate::models::request::content_type_of;
use serde_json::Value;
use std::collections::HashMap;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Checks whether a Content-Type value declares JSON.
///
/// Matches `application/json` anywhere in the value, ignoring case, so
/// parameters such as `; charset=utf-8` are accepted.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(JSON_MEDIA_TYPE)
}

/// Validates and canonicalizes `body` according to `headers`.
///
/// # Returns
///
/// * The compact re-serialization when the Content-Type declares JSON and the
///   body is non-empty
/// * `body` unchanged otherwise
///
/// # Errors
///
/// [`RequestError::InvalidJsonBody`] when the body declares JSON but is not.
pub fn normalize_body(body: &str, headers: &HashMap<String, String>) -> Result<String, RequestError> {
    if body.is_empty() {
        return Ok(String::new());
    }

    let declares_json = content_type_of(headers).map_or(false, is_json_content_type);
    if !declares_json {
        return Ok(body.to_string());
    }

    let value: Value = serde_json::from_str(body).map_err(RequestError::InvalidJsonBody)?;
    serde_json::to_string(&value).map_err(RequestError::InvalidJsonBody)
}

/// Pretty-prints a JSON document with two-space indentation.
///
/// Used for displaying bodies; returns the parse error for non-JSON input.
pub fn format_json(text: &str) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    serde_json::to_string_pretty(&value)
}
