//! Shared fixtures for the integration suites.

pub mod audit_log_test;
pub mod resolver_props_test;

use api_exchange::config::ClientConfig;
use api_exchange::diagnostics::{DiagnosticsSink, NullSink};
use api_exchange::environment::ActiveEnvironment;
use api_exchange::pipeline::RequestPipeline;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Installs a test logger once per process.
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Environment provider with a fixed base URL.
pub fn fixed_environment(base_url: impl Into<String>) -> Arc<dyn ActiveEnvironment> {
    let base_url = base_url.into();
    Arc::new(move || Some(base_url.clone()))
}

/// Environment provider with nothing active.
pub fn no_environment() -> Arc<dyn ActiveEnvironment> {
    Arc::new(|| None::<String>)
}

/// Builds a pipeline whose audit log lives under `dir`.
pub fn pipeline_in(
    dir: &TempDir,
    environment: Arc<dyn ActiveEnvironment>,
    sink: Arc<dyn DiagnosticsSink>,
) -> RequestPipeline {
    init_test_env();
    RequestPipeline::builder(ClientConfig::with_storage_dir(dir.path()), environment)
        .diagnostics(sink)
        .build()
        .expect("pipeline should build")
}

/// Same as [`pipeline_in`] with diagnostics discarded.
pub fn quiet_pipeline(dir: &TempDir, environment: Arc<dyn ActiveEnvironment>) -> RequestPipeline {
    pipeline_in(dir, environment, Arc::new(NullSink))
}

/// Address nothing listens on.
pub fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

/// Accepts connections and holds them open for `hold` without answering.
pub fn silent_server(hold: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            thread::spawn(move || {
                thread::sleep(hold);
                drop(stream);
            });
        }
    });
    addr
}

/// Answers every request with a `Content-Length` larger than the body it
/// actually sends, then closes the connection.
pub fn truncated_body_server(declared: usize, sent: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n",
                declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(sent);
            let _ = stream.flush();
            drop(stream);
        }
    });
    addr
}
