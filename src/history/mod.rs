//! Bounded audit log of completed exchanges.
//!
//! Every exchange that produces a response is recorded as an [`AuditRecord`]
//! and kept in an [`AuditLogStore`]: newest first, at most
//! [`MAX_LOG_ENTRIES`] records, mirrored to a pretty-printed JSON file.
//!
//! # Example
//!
//! ```no_run
//! use api_exchange::diagnostics::LogSink;
//! use api_exchange::history::AuditLogStore;
//! use std::sync::Arc;
//!
//! let store = AuditLogStore::open("/tmp/api-exchange/logs/request_logs.json", Arc::new(LogSink));
//! for record in store.list() {
//!     println!("{} {} {} -> {}", record.id, record.method, record.url, record.status);
//! }
//! ```

pub mod models;
pub mod storage;

pub use models::{generate_record_id, AuditRecord, HistoryError, LoggedRequest, LoggedResponse};
pub use storage::{AuditLogStore, MAX_LOG_ENTRIES};
