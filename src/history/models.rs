//! Data models for the audit log.
//!
//! An [`AuditRecord`] is an immutable snapshot of one completed exchange: the
//! request as it was actually sent (resolved URL, merged headers, normalized
//! body) and the response as it was received.

use crate::models::request::headers_or_empty;
use crate::models::{ExchangeRequest, ExchangeResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Process-wide sequence appended to record ids.
static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generates a record id from a completion timestamp.
///
/// The id is the timestamp at millisecond precision (`20261018153012.123`)
/// followed by a monotonic sequence number, so records completed within the
/// same millisecond still get distinct ids.
pub fn generate_record_id(at: DateTime<Utc>) -> String {
    let sequence = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:06}", at.format("%Y%m%d%H%M%S%.3f"), sequence)
}

/// The request half of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedRequest {
    pub method: String,
    pub url: String,
    #[serde(default, deserialize_with = "headers_or_empty")]
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// The response half of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedResponse {
    pub status_code: u16,
    pub status: String,
    #[serde(default, deserialize_with = "headers_or_empty")]
    pub headers: HashMap<String, String>,
    pub body: String,
    pub size: u64,
}

/// A persisted snapshot of one completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Timestamp-derived identifier, see [`generate_record_id`].
    pub id: String,

    /// HTTP method that was sent.
    pub method: String,

    /// Absolute URL that was requested.
    pub url: String,

    /// Response status code.
    pub status: u16,

    /// Time the exchange completed, in UTC.
    pub timestamp: DateTime<Utc>,

    /// Exchange duration in milliseconds.
    pub duration: u64,

    /// Copy of the request as sent.
    pub request: LoggedRequest,

    /// Copy of the response as received.
    pub response: LoggedResponse,
}

impl AuditRecord {
    /// Creates a record for a completed exchange, stamped with the current time.
    pub fn from_exchange(request: &ExchangeRequest, response: &ExchangeResponse) -> Self {
        Self::from_exchange_at(request, response, Utc::now())
    }

    /// Creates a record for an exchange that completed at `completed_at`.
    pub fn from_exchange_at(
        request: &ExchangeRequest,
        response: &ExchangeResponse,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_record_id(completed_at),
            method: request.method.clone(),
            url: request.url.clone(),
            status: response.status_code,
            timestamp: completed_at,
            duration: response.duration,
            request: LoggedRequest {
                method: request.method.clone(),
                url: request.url.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            },
            response: LoggedResponse {
                status_code: response.status_code,
                status: response.status.clone(),
                headers: response.headers.clone(),
                body: response.body.clone(),
                size: response.size,
            },
        }
    }
}

/// Errors raised while persisting or exporting the audit log.
///
/// These never abort a request; the store reports them to its diagnostics
/// sink instead.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Error occurred during storage operations (file I/O).
    #[error("audit log storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Error occurred during serialization or deserialization.
    #[error("audit log serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
