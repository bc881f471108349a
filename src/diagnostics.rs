//! Fire-and-forget reporting of non-fatal failures.
//!
//! Header merges and log persistence are best-effort: when they fail the
//! pipeline carries on and the failure is handed to a [`DiagnosticsSink`].
//! Reporting never blocks and never fails from the caller's point of view.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

/// A non-fatal failure observed by the pipeline or the audit log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Header templates for a collection could not be merged.
    HeaderMergeFailed {
        /// Scope whose templates were requested
        collection_id: String,
        /// Rendered cause
        reason: String,
    },

    /// The audit log file could not be read, parsed or written.
    PersistenceFailed {
        /// Backing file involved
        path: PathBuf,
        /// Rendered cause
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::HeaderMergeFailed {
                collection_id,
                reason,
            } => write!(
                f,
                "failed to merge header templates for collection '{}': {}",
                collection_id, reason
            ),
            Diagnostic::PersistenceFailed { path, reason } => {
                write!(f, "audit log persistence failed for {}: {}", path.display(), reason)
            }
        }
    }
}

/// Receives non-fatal diagnostics.
///
/// Implementations must return promptly; the caller may be holding the audit
/// log lock.
pub trait DiagnosticsSink: Send + Sync {
    /// Reports a diagnostic. Delivery is not guaranteed.
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Discards every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Sends diagnostics over an unbounded channel, e.g. towards a UI event bus.
///
/// A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<Diagnostic>,
}

impl ChannelSink {
    /// Creates a sink together with the receiving end of its channel.
    pub fn new() -> (Self, Receiver<Diagnostic>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl DiagnosticsSink for ChannelSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::debug!("forwarding diagnostic: {}", diagnostic);
        let _ = self.sender.send(diagnostic);
    }
}
