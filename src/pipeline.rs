//! The request pipeline and its public facade.
//!
//! A request flows through five stages:
//!
//! 1. resolve the URL against the active environment
//! 2. merge collection header templates (best-effort)
//! 3. validate and canonicalize the body
//! 4. execute the exchange
//! 5. append an audit record (best-effort)
//!
//! Failures in stages 1, 3 and 4 are returned to the caller and leave the
//! audit log untouched. Failures in stages 2 and 5 go to the diagnostics sink
//! and the request carries on.

use crate::config::{ClientConfig, ConfigError};
use crate::diagnostics::{Diagnostic, DiagnosticsSink, LogSink};
use crate::environment::{resolve_url, ActiveEnvironment};
use crate::executor::{
    self, build_client, execute_exchange, normalize_body, CancelError, CancellationToken,
    ExecutionConfig, RequestError, RequestTracker,
};
use crate::headers::HeaderTemplates;
use crate::history::{AuditLogStore, AuditRecord, HistoryError};
use crate::models::{ExchangeRequest, ExchangeResponse};
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Builder for [`RequestPipeline`].
pub struct PipelineBuilder {
    config: ClientConfig,
    environment: Arc<dyn ActiveEnvironment>,
    header_templates: Option<Arc<dyn HeaderTemplates>>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl PipelineBuilder {
    /// Uses `templates` for requests that name a collection.
    pub fn header_templates(mut self, templates: Arc<dyn HeaderTemplates>) -> Self {
        self.header_templates = Some(templates);
        self
    }

    /// Sends non-fatal failures to `sink` instead of the log.
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Validates the configuration, builds the HTTP client and opens the
    /// audit log under the configured storage directory.
    pub fn build(self) -> Result<RequestPipeline, ConfigError> {
        self.config.validate().map_err(ConfigError::Invalid)?;
        let client = build_client(&self.config)?;
        let store = AuditLogStore::from_config(&self.config, Arc::clone(&self.sink));

        log::debug!(
            "Request pipeline ready, audit log at {}",
            store.path().display()
        );

        Ok(RequestPipeline {
            client,
            config: self.config,
            environment: self.environment,
            header_templates: self.header_templates,
            store,
            sink: self.sink,
            tracker: RequestTracker::new(),
        })
    }
}

/// Executes requests and records them in the audit log.
///
/// The pipeline is `Send + Sync`; share it behind an `Arc` to issue requests
/// from several threads.
pub struct RequestPipeline {
    client: Client,
    config: ClientConfig,
    environment: Arc<dyn ActiveEnvironment>,
    header_templates: Option<Arc<dyn HeaderTemplates>>,
    store: AuditLogStore,
    sink: Arc<dyn DiagnosticsSink>,
    tracker: RequestTracker,
}

impl RequestPipeline {
    /// Starts building a pipeline. Diagnostics default to [`LogSink`].
    pub fn builder(config: ClientConfig, environment: Arc<dyn ActiveEnvironment>) -> PipelineBuilder {
        PipelineBuilder {
            config,
            environment,
            header_templates: None,
            sink: Arc::new(LogSink),
        }
    }

    /// Builds a pipeline without header templates that logs diagnostics.
    pub fn new(
        config: ClientConfig,
        environment: Arc<dyn ActiveEnvironment>,
    ) -> Result<Self, ConfigError> {
        Self::builder(config, environment).build()
    }

    /// Configuration the pipeline was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The audit log backing this pipeline.
    pub fn store(&self) -> &AuditLogStore {
        &self.store
    }

    /// Sends `request` with the configured timeout.
    pub fn send_request(&self, request: &ExchangeRequest) -> Result<ExchangeResponse, RequestError> {
        let exec_config = ExecutionConfig::from_client_config(&self.config);
        self.send_request_with(request, &exec_config, None)
    }

    /// Sends `request` with explicit execution settings.
    ///
    /// The exchange is registered with the request tracker for its duration,
    /// so [`cancel_request`](Self::cancel_request) and
    /// [`cancel_most_recent_request`](Self::cancel_most_recent_request) can
    /// abort it. A caller-supplied `cancel` token works as well.
    pub fn send_request_with(
        &self,
        request: &ExchangeRequest,
        exec_config: &ExecutionConfig,
        cancel: Option<&CancellationToken>,
    ) -> Result<ExchangeResponse, RequestError> {
        let started = Instant::now();

        let url = resolve_url(&request.url, self.environment.as_ref())?;
        log::debug!("Resolved '{}' to '{}'", request.url, url);

        let headers = self.merge_headers(request);
        let body = normalize_body(&request.body, &headers)?;

        let prepared = ExchangeRequest {
            method: request.method.clone(),
            url,
            headers,
            body,
            collection_id: request.collection_id.clone(),
        };

        let token = cancel.cloned().unwrap_or_default();
        let request_id = self.tracker.register(token.clone());
        log::debug!("Tracking {} as {}", prepared.url, request_id);

        let result = execute_exchange(&self.client, &prepared, exec_config, started, Some(&token));
        self.tracker.finish(&request_id);

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::debug!(
                    "{} {} failed at {} stage: {}",
                    prepared.method,
                    prepared.url,
                    e.stage(),
                    e
                );
                return Err(e);
            }
        };

        log::info!(
            "{} {} -> {} ({}ms, {} bytes)",
            prepared.method,
            prepared.url,
            response.status,
            response.duration,
            response.size
        );

        self.store
            .append(AuditRecord::from_exchange(&prepared, &response));

        Ok(response)
    }

    /// Request headers merged over the collection's templates. Falls back to
    /// the request headers when the merge fails.
    fn merge_headers(&self, request: &ExchangeRequest) -> HashMap<String, String> {
        let (Some(collection_id), Some(templates)) =
            (request.collection_id.as_deref(), self.header_templates.as_ref())
        else {
            return request.headers.clone();
        };

        match templates.merge_headers(collection_id, &request.headers) {
            Ok(merged) => merged,
            Err(e) => {
                self.sink.report(Diagnostic::HeaderMergeFailed {
                    collection_id: collection_id.to_string(),
                    reason: e.to_string(),
                });
                request.headers.clone()
            }
        }
    }

    /// All audit records, newest first.
    pub fn get_all_logs(&self) -> Vec<AuditRecord> {
        self.store.list()
    }

    /// The audit record with `id`, if it is still retained.
    pub fn get_log_by_id(&self, id: &str) -> Option<AuditRecord> {
        self.store.get(id)
    }

    /// Removes every audit record.
    pub fn clear_logs(&self) {
        self.store.clear();
    }

    pub fn get_logs_count(&self) -> usize {
        self.store.count()
    }

    /// The audit log as pretty-printed JSON, newest first.
    pub fn export_logs_as_json(&self) -> Result<String, HistoryError> {
        self.store.export_json()
    }

    pub fn validate_url(&self, url: &str) -> bool {
        executor::validate_url(url)
    }

    pub fn supported_methods(&self) -> Vec<String> {
        crate::models::supported_methods()
    }

    pub fn format_json(&self, text: &str) -> Result<String, serde_json::Error> {
        executor::format_json(text)
    }

    /// Ids of the exchanges currently in flight, oldest first. These are the
    /// ids [`cancel_request`](Self::cancel_request) accepts.
    pub fn in_flight_request_ids(&self) -> Vec<String> {
        self.tracker.in_flight_ids()
    }

    /// Cancels the in-flight request with tracker id `id`.
    pub fn cancel_request(&self, id: &str) -> Result<(), CancelError> {
        self.tracker.cancel(id)
    }

    /// Cancels the most recently started in-flight request and returns its id.
    pub fn cancel_most_recent_request(&self) -> Result<String, CancelError> {
        self.tracker.cancel_most_recent()
    }

    /// Number of exchanges currently in flight.
    pub fn active_request_count(&self) -> usize {
        self.tracker.in_flight_count()
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
