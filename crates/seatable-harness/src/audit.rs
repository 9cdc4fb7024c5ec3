// crates/seatable-harness/src/audit.rs
// ============================================================================
// Module: Call Audit Logging
// Description: Structured audit events for API calls and fixture teardown.
// Purpose: Record every HTTP exchange and teardown attempt without secrets.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every HTTP exchange issued by [`crate::ApiClient`] produces exactly one
//! [`CallAuditEvent`], emitted after the exchange completes, whether it
//! succeeded, failed validation, or never reached the server. Fixture
//! teardown attempts produce [`FixtureAuditEvent`] records so cleanup failures
//! stay visible without altering a test result.
//!
//! Events carry method, URL, status, and timing only. Headers and bodies are
//! never recorded, so bearer tokens and passwords cannot reach a sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label for an audited API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// Response received and not validated.
    Unvalidated,
    /// Response received and conformed to its declared contract.
    Conformant,
    /// Response violated its contract under an explicit allowance.
    KnownDeviation,
    /// Response violated its declared contract.
    ContractViolation,
    /// The exchange failed before a response was read.
    TransportError,
}

/// Fixture lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixturePhase {
    /// Resource creation.
    Setup,
    /// Resource deletion.
    Teardown,
}

/// Fixture step outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureOutcome {
    /// Step completed.
    Ok,
    /// Step failed.
    Failed,
}

/// API call audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation identifier, `None` for calls outside the schema (uploads).
    pub operation_id: Option<String>,
    /// HTTP method.
    pub method: String,
    /// Fully resolved request URL.
    pub url: String,
    /// Response status code when a response was received.
    pub status: Option<u16>,
    /// Call outcome.
    pub outcome: CallOutcome,
    /// Wall-clock duration of the exchange.
    pub elapsed_ms: u128,
    /// Error summary when the call failed.
    pub error: Option<String>,
}

/// Inputs required to construct a call audit event.
pub struct CallAuditEventParams {
    /// Operation identifier.
    pub operation_id: Option<String>,
    /// HTTP method.
    pub method: String,
    /// Fully resolved request URL.
    pub url: String,
    /// Response status code.
    pub status: Option<u16>,
    /// Call outcome.
    pub outcome: CallOutcome,
    /// Wall-clock duration of the exchange.
    pub elapsed_ms: u128,
    /// Error summary.
    pub error: Option<String>,
}

/// Fixture audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Resource kind label (group, base, team, ...).
    pub resource: String,
    /// Remote identifier of the resource when known.
    pub id: Option<String>,
    /// Lifecycle phase.
    pub phase: FixturePhase,
    /// Step outcome.
    pub outcome: FixtureOutcome,
    /// Error summary when the step failed.
    pub error: Option<String>,
}

/// Inputs required to construct a fixture audit event.
pub struct FixtureAuditEventParams {
    /// Resource kind label.
    pub resource: String,
    /// Remote identifier.
    pub id: Option<String>,
    /// Lifecycle phase.
    pub phase: FixturePhase,
    /// Step outcome.
    pub outcome: FixtureOutcome,
    /// Error summary.
    pub error: Option<String>,
}

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl CallAuditEvent {
    /// Creates a new call audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: CallAuditEventParams) -> Self {
        Self {
            event: "api_call",
            timestamp_ms: now_ms(),
            operation_id: params.operation_id,
            method: params.method,
            url: params.url,
            status: params.status,
            outcome: params.outcome,
            elapsed_ms: params.elapsed_ms,
            error: params.error,
        }
    }
}

impl FixtureAuditEvent {
    /// Creates a new fixture audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: FixtureAuditEventParams) -> Self {
        Self {
            event: "fixture",
            timestamp_ms: now_ms(),
            resource: params.resource,
            id: params.id,
            phase: params.phase,
            outcome: params.outcome,
            error: params.error,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for API call events.
pub trait CallAuditSink: Send + Sync {
    /// Record an API call event.
    fn record_call(&self, event: &CallAuditEvent);

    /// Record a fixture lifecycle event.
    fn record_fixture(&self, _event: &FixtureAuditEvent) {}
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl CallAuditSink for StderrAuditSink {
    fn record_call(&self, event: &CallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_fixture(&self, event: &FixtureAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl CallAuditSink for FileAuditSink {
    fn record_call(&self, event: &CallAuditEvent) {
        self.append(event);
    }

    fn record_fixture(&self, event: &FixtureAuditEvent) {
        self.append(event);
    }
}

/// Audit sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Captured call events.
    calls: Mutex<Vec<CallAuditEvent>>,
    /// Captured fixture events.
    fixtures: Mutex<Vec<FixtureAuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the captured call events.
    #[must_use]
    pub fn calls(&self) -> Vec<CallAuditEvent> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Returns a copy of the captured fixture events.
    #[must_use]
    pub fn fixtures(&self) -> Vec<FixtureAuditEvent> {
        self.fixtures.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl CallAuditSink for MemoryAuditSink {
    fn record_call(&self, event: &CallAuditEvent) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(event.clone());
        }
    }

    fn record_fixture(&self, event: &FixtureAuditEvent) {
        if let Ok(mut events) = self.fixtures.lock() {
            events.push(event.clone());
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl CallAuditSink for NoopAuditSink {
    fn record_call(&self, _event: &CallAuditEvent) {}

    fn record_fixture(&self, _event: &FixtureAuditEvent) {}
}
