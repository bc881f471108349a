//! Persistent, bounded audit log.
//!
//! The store keeps the newest [`MAX_LOG_ENTRIES`] records in memory, newest
//! first, and mirrors them to a single JSON file. The file is read once when
//! the store is opened; afterwards memory is authoritative and the file is
//! rewritten in full after every mutation, inside the same write lock, so a
//! reader never sees state that has not been flushed.
//!
//! Persistence is best-effort: read and write failures are reported to the
//! diagnostics sink and never surface to callers.

use super::models::{AuditRecord, HistoryError};
use crate::config::ClientConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Maximum number of records retained.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Concurrency-safe audit log backed by a JSON file.
pub struct AuditLogStore {
    records: RwLock<Vec<AuditRecord>>,
    path: PathBuf,
    sink: Arc<dyn DiagnosticsSink>,
}

impl std::fmt::Debug for AuditLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogStore")
            .field("path", &self.path)
            .field("count", &self.count())
            .finish()
    }
}

impl AuditLogStore {
    /// Opens the store backed by `path`.
    ///
    /// A missing file starts an empty log. An unreadable or malformed file
    /// also starts an empty log and is reported as
    /// [`Diagnostic::PersistenceFailed`]; it is left on disk until the next
    /// mutation overwrites it.
    pub fn open(path: impl Into<PathBuf>, sink: Arc<dyn DiagnosticsSink>) -> Self {
        let path = path.into();

        let records = match load_records(&path) {
            Ok(mut records) => {
                records.truncate(MAX_LOG_ENTRIES);
                log::debug!(
                    "Loaded {} audit records from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            Err(e) => {
                sink.report(Diagnostic::PersistenceFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };

        Self {
            records: RwLock::new(records),
            path,
            sink,
        }
    }

    /// Opens the store at the log file location named by `config`.
    pub fn from_config(config: &ClientConfig, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self::open(config.log_file_path(), sink)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<AuditRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<AuditRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prepends `record`, evicts the oldest entries beyond the limit and
    /// flushes the log to disk.
    pub fn append(&self, record: AuditRecord) {
        let mut records = self.write();
        records.insert(0, record);
        records.truncate(MAX_LOG_ENTRIES);
        self.persist(&records);
    }

    /// Returns a copy of all records, newest first.
    pub fn list(&self) -> Vec<AuditRecord> {
        self.read().clone()
    }

    /// Looks up a record by id. `None` means not found.
    pub fn get(&self, id: &str) -> Option<AuditRecord> {
        self.read().iter().find(|record| record.id == id).cloned()
    }

    /// Removes every record and flushes the empty log to disk.
    pub fn clear(&self) {
        let mut records = self.write();
        records.clear();
        self.persist(&records);
    }

    /// Current number of records.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Serializes the log as pretty-printed JSON, newest first.
    pub fn export_json(&self) -> Result<String, HistoryError> {
        let records = self.read();
        Ok(serde_json::to_string_pretty(&*records)?)
    }

    /// Writes `records` to the backing file; must be called with the write
    /// lock held.
    fn persist(&self, records: &[AuditRecord]) {
        if let Err(e) = write_records(&self.path, records) {
            self.sink.report(Diagnostic::PersistenceFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            });
        }
    }
}

/// Reads the records stored at `path`. A missing file is an empty log.
fn load_records(path: &Path) -> Result<Vec<AuditRecord>, HistoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Replaces the file at `path` with `records`.
///
/// Writes to a temporary sibling first and renames it over the target, so an
/// interrupted write leaves the previous log intact.
fn write_records(path: &Path, records: &[AuditRecord]) -> Result<(), HistoryError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(records)?;

    let temp_path = path.with_extension("json.tmp");
    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(json.as_bytes())?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}
