// crates/seatable-harness/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared helpers for seatable-harness integration tests.
// Purpose: Provide fixture paths and a scripted local HTTP server.
// Dependencies: seatable-harness, tiny_http
// ============================================================================

//! ## Overview
//! [`ScriptedServer`] answers a fixed sequence of responses and records every
//! request it receives, so tests can assert on exactly what went over the
//! wire and how many times.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers are shared across suites with panic-based assertions."
)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use seatable_harness::ApiClient;
use seatable_harness::HarnessSettings;
use seatable_harness::MemoryAuditSink;
use seatable_harness::SchemaHandle;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Returns the path of a fixture document.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Loads the rows fixture bound to `base_url`.
pub fn rows_schema(base_url: &str) -> SchemaHandle {
    SchemaHandle::load(&fixture_path("rows.yaml"), base_url).expect("rows fixture")
}

/// Builds a client with short timeouts and an in-memory audit sink.
pub fn client() -> (ApiClient, Arc<MemoryAuditSink>) {
    client_with(HarnessSettings {
        timeout_ms: 5_000,
        connect_timeout_ms: 1_000,
        ..HarnessSettings::default()
    })
}

/// Builds a client from explicit settings.
pub fn client_with(settings: HarnessSettings) -> (ApiClient, Arc<MemoryAuditSink>) {
    let audit = Arc::new(MemoryAuditSink::new());
    let client = ApiClient::new(settings, audit.clone()).expect("client");
    (client, audit)
}

// ============================================================================
// SECTION: Scripted Server
// ============================================================================

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Status code.
    pub status: u16,
    /// Content type header, omitted when `None`.
    pub content_type: Option<&'static str>,
    /// Response body.
    pub body: String,
}

impl Reply {
    /// JSON reply.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string(),
        }
    }

    /// Reply with an arbitrary content type.
    pub fn raw(status: u16, content_type: Option<&'static str>, body: &str) -> Self {
        Self {
            status,
            content_type,
            body: body.to_string(),
        }
    }
}

/// A request captured by the server.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// HTTP method.
    pub method: String,
    /// Request target (path and query).
    pub url: String,
    /// Headers as lowercase name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl Recorded {
    /// Returns the first header value with `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Local server answering a fixed reply sequence.
pub struct ScriptedServer {
    /// Base URL of the server.
    pub base_url: String,
    /// Requests received so far.
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    /// Serving thread.
    handle: Option<thread::JoinHandle<()>>,
}

impl ScriptedServer {
    /// Starts a server that answers `replies` in order, then stops.
    pub fn start(replies: Vec<Reply>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind stub server");
        let addr = server.server_addr().to_ip().expect("ip address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            for reply in replies {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(5)) else {
                    return;
                };
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let headers = request
                    .headers()
                    .iter()
                    .map(|header| {
                        (header.field.to_string().to_ascii_lowercase(), header.value.to_string())
                    })
                    .collect();
                captured.lock().expect("lock").push(Recorded {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers,
                    body,
                });
                let mut response =
                    Response::from_data(reply.body.into_bytes()).with_status_code(reply.status);
                if let Some(content_type) = reply.content_type {
                    let header = Header::from_bytes("Content-Type", content_type).expect("header");
                    response = response.with_header(header);
                }
                let _ = request.respond(response);
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle: Some(handle),
        }
    }

    /// Waits for the script to finish and returns every recorded request.
    pub fn finish(mut self) -> Vec<Recorded> {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("server thread");
        }
        self.requests.lock().expect("lock").clone()
    }
}

/// Returns a base URL on which nothing listens.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}
