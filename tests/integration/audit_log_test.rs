//! Audit log behavior across pipeline instances and on disk.

use super::{fixed_environment, init_test_env, pipeline_in, quiet_pipeline};
use api_exchange::diagnostics::{ChannelSink, Diagnostic, NullSink};
use api_exchange::history::{AuditLogStore, AuditRecord, MAX_LOG_ENTRIES};
use api_exchange::models::{ExchangeRequest, ExchangeResponse};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn record(n: usize) -> AuditRecord {
    let request = ExchangeRequest::new("GET", format!("https://api.example.com/orders/{}", n));
    let response = ExchangeResponse {
        status_code: 200,
        status: "200 OK".to_string(),
        headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
        body: format!("{{\"order\":{}}}", n),
        duration: 3,
        size: 11,
    };
    AuditRecord::from_exchange(&request, &response)
}

#[test]
fn test_log_survives_restart() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/orders").with_status(200).with_body("[]").create();

    let dir = TempDir::new().unwrap();
    let before = {
        let pipeline = quiet_pipeline(&dir, fixed_environment(server.url()));
        for _ in 0..3 {
            pipeline
                .send_request(&ExchangeRequest::new("GET", "/orders"))
                .unwrap();
        }
        pipeline.get_all_logs()
    };

    let restarted = quiet_pipeline(&dir, fixed_environment(server.url()));
    assert_eq!(restarted.get_all_logs(), before);
    assert_eq!(restarted.get_logs_count(), 3);
}

#[test]
fn test_eviction_beyond_limit() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let store = AuditLogStore::open(dir.path().join("request_logs.json"), Arc::new(NullSink));

    let appended: Vec<_> = (0..MAX_LOG_ENTRIES + 20).map(record).collect();
    for r in &appended {
        store.append(r.clone());
    }

    let expected: Vec<_> = appended.iter().rev().take(MAX_LOG_ENTRIES).cloned().collect();
    assert_eq!(store.list(), expected);

    let reopened = AuditLogStore::open(store.path(), Arc::new(NullSink));
    assert_eq!(reopened.list(), expected);
}

#[test]
fn test_export_matches_list() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let store = AuditLogStore::open(dir.path().join("request_logs.json"), Arc::new(NullSink));
    for n in 0..5 {
        store.append(record(n));
    }

    let exported: Vec<AuditRecord> = serde_json::from_str(&store.export_json().unwrap()).unwrap();
    assert_eq!(exported, store.list());

    let on_disk = fs::read_to_string(store.path()).unwrap();
    assert_eq!(on_disk, store.export_json().unwrap());
}

#[test]
fn test_clear_logs_through_pipeline() {
    let mut server = mockito::Server::new();
    server.mock("DELETE", "/orders/1").with_status(200).create();

    let dir = TempDir::new().unwrap();
    let pipeline = quiet_pipeline(&dir, fixed_environment(server.url()));
    pipeline
        .send_request(&ExchangeRequest::new("DELETE", "/orders/1"))
        .unwrap();
    assert_eq!(pipeline.get_logs_count(), 1);

    pipeline.clear_logs();

    assert_eq!(pipeline.get_logs_count(), 0);
    assert_eq!(pipeline.export_logs_as_json().unwrap(), "[]");
    assert_eq!(fs::read_to_string(pipeline.store().path()).unwrap(), "[]");
}

#[test]
fn test_concurrent_appends_keep_every_record() {
    const THREADS: usize = 6;
    const PER_THREAD: usize = 10;

    init_test_env();
    let dir = TempDir::new().unwrap();
    let store = Arc::new(AuditLogStore::open(
        dir.path().join("request_logs.json"),
        Arc::new(NullSink),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for n in 0..PER_THREAD {
                    store.append(record(t * PER_THREAD + n));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.count(), THREADS * PER_THREAD);

    let on_disk: Vec<AuditRecord> =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk, store.list());
}

#[test]
fn test_malformed_log_file_at_startup() {
    let dir = TempDir::new().unwrap();
    let logs_dir = dir.path().join("logs");
    fs::create_dir_all(&logs_dir).unwrap();
    fs::write(logs_dir.join("request_logs.json"), "not json at all").unwrap();

    let (sink, diagnostics) = ChannelSink::new();
    let pipeline = pipeline_in(&dir, fixed_environment("http://localhost:3000"), Arc::new(sink));

    assert_eq!(pipeline.get_logs_count(), 0);
    assert!(matches!(
        diagnostics.try_recv().unwrap(),
        Diagnostic::PersistenceFailed { .. }
    ));
    assert!(diagnostics.try_recv().is_err());
}

#[test]
fn test_unknown_id_is_none() {
    let dir = TempDir::new().unwrap();
    let pipeline = quiet_pipeline(&dir, fixed_environment("http://localhost:3000"));
    assert!(pipeline.get_log_by_id("20260101000000.000-000000").is_none());
}
