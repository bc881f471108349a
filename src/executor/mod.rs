//! HTTP exchange execution.
//!
//! This module performs the network part of a request with the blocking
//! `reqwest` client: it builds the outbound request, sends it, drains the
//! response body and captures status, headers, timing and size.
//!
//! When a [`CancellationToken`] is supplied the exchange runs on a worker
//! thread while the calling thread waits for either the result or the token.
//! A cancelled exchange is abandoned; whatever the worker later produces is
//! discarded.
//!
//! The blocking client offers no way to interrupt a send in progress, so
//! cancelling frees the caller but not the connection: the abandoned worker
//! keeps its socket until the server answers or the request timeout expires.
//! Without a token the exchange runs on the calling thread and no worker is
//! spawned. [`RequestPipeline`](crate::pipeline::RequestPipeline) always
//! passes a token so that every exchange can be cancelled by id.

pub mod cancellation;
pub mod config;
pub mod error;
pub mod normalize;

pub use cancellation::{CancelError, CancellationToken, RequestTracker};
pub use config::ExecutionConfig;
pub use error::{BoxError, RequestError, Stage};
pub use normalize::{format_json, is_json_content_type, normalize_body};

use crate::config::{ClientConfig, ConfigError};
use crate::models::response::status_text;
use crate::models::{ExchangeRequest, ExchangeResponse};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

/// How often a waiting caller checks its cancellation token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Builds the shared blocking client from configuration.
///
/// Applies the end-to-end timeout, the redirect policy and the default
/// headers. Request headers later replace defaults with the same name.
pub fn build_client(config: &ClientConfig) -> Result<Client, ConfigError> {
    let redirect = if config.follow_redirects {
        reqwest::redirect::Policy::limited(config.max_redirects as usize)
    } else {
        reqwest::redirect::Policy::none()
    };

    let default_headers = build_header_map(&config.default_headers)
        .map_err(|e| ConfigError::Invalid(format!("defaultHeaders: {}", e)))?;

    Client::builder()
        .timeout(config.timeout_duration())
        .redirect(redirect)
        .default_headers(default_headers)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))
}

/// Executes one exchange and captures the response.
///
/// `request` must already carry an absolute URL and its final headers and
/// body. `started` marks the beginning of the pipeline; the response duration
/// is measured from it to the moment the body has been fully read.
///
/// # Errors
///
/// * [`RequestError::InvalidRequest`] for an invalid method or header
/// * [`RequestError::RequestFailed`] for DNS, connect, TLS and timeout failures
/// * [`RequestError::ResponseReadFailed`] when the body stream breaks
/// * [`RequestError::Cancelled`] when `cancel` fires before completion
pub fn execute_exchange(
    client: &Client,
    request: &ExchangeRequest,
    config: &ExecutionConfig,
    started: Instant,
    cancel: Option<&CancellationToken>,
) -> Result<ExchangeResponse, RequestError> {
    if cancel.map_or(false, CancellationToken::is_cancelled) {
        return Err(RequestError::Cancelled);
    }

    let builder = build_request(client, request, config)?;
    log::debug!("Sending {} {}", request.method, request.url);

    let result = match cancel {
        None => send_and_capture(builder, started),
        Some(token) => run_cancellable(builder, started, token)?,
    };

    if cancel.map_or(false, CancellationToken::is_cancelled) {
        return Err(RequestError::Cancelled);
    }

    result
}

fn build_request(
    client: &Client,
    request: &ExchangeRequest,
    config: &ExecutionConfig,
) -> Result<RequestBuilder, RequestError> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes()).map_err(|e| {
        RequestError::InvalidRequest(format!("invalid method '{}': {}", request.method, e))
    })?;

    let headers = build_header_map(&request.headers).map_err(RequestError::InvalidRequest)?;

    let mut builder = client
        .request(method, request.url.as_str())
        .headers(headers)
        .timeout(config.effective_timeout(Instant::now()));

    // An empty body is sent as no body at all.
    if request.has_body() {
        builder = builder.body(request.body.clone());
    }

    Ok(builder)
}

/// Converts a string map into a `HeaderMap` with replace semantics.
fn build_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, String> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| format!("invalid header name '{}': {}", name, e))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| format!("invalid value for header '{}': {}", name, e))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn run_cancellable(
    builder: RequestBuilder,
    started: Instant,
    token: &CancellationToken,
) -> Result<Result<ExchangeResponse, RequestError>, RequestError> {
    let (sender, receiver) = mpsc::channel();

    std::thread::Builder::new()
        .name("exchange-worker".to_string())
        .spawn(move || {
            let _ = sender.send(send_and_capture(builder, started));
        })
        .map_err(|e| RequestError::RequestFailed(Box::new(e)))?;

    loop {
        match receiver.recv_timeout(CANCEL_POLL_INTERVAL) {
            Ok(result) => return Ok(result),
            Err(RecvTimeoutError::Timeout) => {
                if token.is_cancelled() {
                    log::debug!("Exchange cancelled while in flight");
                    return Err(RequestError::Cancelled);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(RequestError::RequestFailed(
                    "exchange worker exited without a result".into(),
                ));
            }
        }
    }
}

fn send_and_capture(
    builder: RequestBuilder,
    started: Instant,
) -> Result<ExchangeResponse, RequestError> {
    let response = builder
        .send()
        .map_err(|e| RequestError::RequestFailed(Box::new(e)))?;
    capture_response(response, started)
}

fn capture_response(response: Response, started: Instant) -> Result<ExchangeResponse, RequestError> {
    let status = response.status();
    let headers = flatten_headers(response.headers());

    let body = response
        .bytes()
        .map_err(|e| RequestError::ResponseReadFailed(Box::new(e)))?;

    let duration = started.elapsed().as_millis() as u64;

    Ok(ExchangeResponse {
        status_code: status.as_u16(),
        status: status_text(status.as_u16(), status.canonical_reason()),
        headers,
        size: body.len() as u64,
        body: String::from_utf8_lossy(&body).into_owned(),
        duration,
    })
}

/// Flattens a header map to one string per name.
///
/// Repeated headers are joined with `", "` in the order received.
pub fn flatten_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut flat = HashMap::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        flat.insert(name.as_str().to_string(), joined);
    }
    flat
}

/// Checks whether `url` looks like a usable HTTP URL.
///
/// An empty string is invalid. A URL without a scheme is checked as if it
/// started with `http://`.
pub fn validate_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    let candidate = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };

    match url::Url::parse(&candidate) {
        Ok(parsed) => parsed.host_str().map_or(false, |host| !host.is_empty()),
        Err(_) => false,
    }
}
