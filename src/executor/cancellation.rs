//! Cancellation of in-flight exchanges.
//!
//! Every exchange runs with a [`CancellationToken`]. The pipeline files the
//! token with a [`RequestTracker`] under a generated id (`req-1`, `req-2`, ...)
//! for as long as the exchange is in flight, which lets a caller abort it by
//! id or abort whatever was started last.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Cloneable flag shared between a caller and a running exchange.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why a cancel request could not be honored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancelError {
    /// No in-flight exchange has this id; it may already have finished.
    #[error("no in-flight request with id {0}")]
    NotFound(String),

    #[error("no requests in flight")]
    NothingInFlight,
}

#[derive(Debug)]
struct InFlight {
    id: String,
    token: CancellationToken,
}

/// Registry of in-flight exchanges, oldest first.
#[derive(Debug, Default)]
pub struct RequestTracker {
    in_flight: Mutex<Vec<InFlight>>,
    next_id: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Files `token` and returns the id it can be cancelled by.
    pub fn register(&self, token: CancellationToken) -> String {
        let id = format!("req-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.entries().push(InFlight {
            id: id.clone(),
            token,
        });
        id
    }

    /// Forgets `id` once its exchange has finished. Returns whether it was
    /// still filed.
    pub fn finish(&self, id: &str) -> bool {
        let mut entries = self.entries();
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Cancels the exchange filed under `id`.
    pub fn cancel(&self, id: &str) -> Result<(), CancelError> {
        let mut entries = self.entries();
        let index = entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| CancelError::NotFound(id.to_string()))?;

        entries.remove(index).token.cancel();
        log::debug!("Cancelled request {}", id);
        Ok(())
    }

    /// Cancels the most recently registered exchange and returns its id.
    pub fn cancel_most_recent(&self) -> Result<String, CancelError> {
        let entry = self
            .entries()
            .pop()
            .ok_or(CancelError::NothingInFlight)?;

        entry.token.cancel();
        log::debug!("Cancelled most recent request {}", entry.id);
        Ok(entry.id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.entries().len()
    }

    /// Ids of the in-flight exchanges, oldest first.
    pub fn in_flight_ids(&self) -> Vec<String> {
        self.entries().iter().map(|entry| entry.id.clone()).collect()
    }
}
