//! Request execution and audit logging for a local API testing client.
//!
//! The crate sends one HTTP request at a time on behalf of a user, returns the
//! captured response and keeps a bounded, persistent audit log of completed
//! exchanges.
//!
//! # Architecture
//!
//! - **models**: the request a caller submits and the response it gets back
//! - **environment**: active environment lookup and relative URL resolution
//! - **headers**: collection-scoped header templates
//! - **executor**: body normalization, the blocking HTTP exchange, cancellation
//! - **history**: audit records and the bounded JSON-backed store
//! - **diagnostics**: sinks for best-effort failures
//! - **config**: client settings and their defaults
//! - **pipeline**: [`RequestPipeline`], which ties the stages together and
//!   exposes the public operations
//!
//! # Usage
//!
//! ```no_run
//! use api_exchange::config::ClientConfig;
//! use api_exchange::environment::{EnvironmentSession, Environments};
//! use api_exchange::models::ExchangeRequest;
//! use api_exchange::pipeline::RequestPipeline;
//! use std::sync::Arc;
//!
//! let environments = EnvironmentSession::new(Environments::defaults());
//! let pipeline = RequestPipeline::new(ClientConfig::default(), Arc::new(environments))?;
//!
//! let request = ExchangeRequest::new("POST", "/v1/users")
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{ "name": "Ada" }"#);
//!
//! let response = pipeline.send_request(&request)?;
//! println!("{} in {}ms", response.status, response.duration);
//!
//! for record in pipeline.get_all_logs() {
//!     println!("{} {} {}", record.id, record.method, record.url);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod executor;
pub mod headers;
pub mod history;
pub mod models;
pub mod pipeline;

pub use config::{load_config, ClientConfig, ConfigError};
pub use diagnostics::{ChannelSink, Diagnostic, DiagnosticsSink, LogSink, NullSink};
pub use environment::{resolve_url, ActiveEnvironment, EnvironmentSession, Environments};
pub use executor::{
    format_json, validate_url, CancelError, CancellationToken, ExecutionConfig, RequestError,
    Stage,
};
pub use headers::{HeaderMergeError, HeaderTemplateSet, HeaderTemplates};
pub use history::{AuditLogStore, AuditRecord, HistoryError, MAX_LOG_ENTRIES};
pub use models::{supported_methods, ExchangeRequest, ExchangeResponse, HttpMethod};
pub use pipeline::{PipelineBuilder, RequestPipeline};
