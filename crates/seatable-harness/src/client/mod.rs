// crates/seatable-harness/src/client/mod.rs
// ============================================================================
// Module: Execution & Validation Engine
// Description: Blocking HTTP execution of cases with contract validation.
// Purpose: Send one bounded request per case and report contract violations.
// Dependencies: reqwest, jsonschema, serde_json, url
// ============================================================================

//! ## Overview
//! [`ApiClient`] sends a [`Case`] over a single blocking HTTP client with
//! finite timeouts and redirects disabled unless configured. Each request
//! moves through `Built -> Sent -> {Validated-OK, Validated-Fail,
//! Unvalidated}` and is never retried. Exactly one [`CallAuditEvent`] is
//! recorded per exchange once its outcome is known, including transport
//! failures.
//!
//! Three entry points exist:
//! - [`ApiClient::call_and_validate`]: the default; any contract violation is
//!   an error.
//! - [`ApiClient::call_allowing`]: for responses known to diverge from their
//!   declared schema. The violation is accepted and recorded, and a response
//!   that unexpectedly conforms fails so the allowance gets removed.
//! - [`ApiClient::call`]: exchange only, no checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::audit::CallAuditEvent;
use crate::audit::CallAuditEventParams;
use crate::audit::CallAuditSink;
use crate::audit::CallOutcome;
use crate::case::Case;
use crate::settings::HarnessSettings;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod checks;
mod response;
mod upload;

pub use response::ApiResponse;
pub use response::Conformance;
pub use upload::UploadFile;
pub use upload::UploadRequest;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// One schema violation with its structural location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer into the response body.
    pub location: String,
    /// JSON pointer into the schema.
    pub schema_path: String,
    /// Violation message with instance values masked.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.location.is_empty() { "/" } else { self.location.as_str() };
        write!(f, "at '{location}': {}", self.message)
    }
}

/// Renders a violation list for error messages.
fn summarize(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Execution and validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallError {
    /// HTTP client construction failed.
    #[error("http client build failed: {0}")]
    Build(String),
    /// The request could not be encoded.
    #[error("failed to encode request for {operation}: {message}")]
    Encode {
        /// Operation label.
        operation: String,
        /// Failure description.
        message: String,
    },
    /// The exchange failed before a complete response was read.
    #[error("transport error for {operation}: {message}")]
    Transport {
        /// Operation label.
        operation: String,
        /// Failure description.
        message: String,
    },
    /// The server answered with a 5xx status.
    #[error("{operation} returned server error {status}")]
    ServerError {
        /// Operation label.
        operation: String,
        /// Status code.
        status: u16,
    },
    /// The status is not declared for the operation.
    #[error("{operation} returned undocumented status {status}")]
    UndocumentedStatus {
        /// Operation label.
        operation: String,
        /// Status code.
        status: u16,
    },
    /// The status differs from the expected one.
    #[error("{operation} expected status {expected}, got {actual}")]
    UnexpectedStatus {
        /// Operation label.
        operation: String,
        /// Expected status (code or class).
        expected: String,
        /// Actual status code.
        actual: u16,
    },
    /// The response content type is not declared for its status.
    #[error("{operation} returned undeclared content type {content_type} for status {status}")]
    ContentType {
        /// Operation label.
        operation: String,
        /// Status code.
        status: u16,
        /// Received content type.
        content_type: String,
    },
    /// The body does not conform to the declared schema.
    #[error("{operation} response for status {status} violates its schema: {}", summarize(.violations))]
    SchemaViolation {
        /// Operation label.
        operation: String,
        /// Status code.
        status: u16,
        /// Reported violations.
        violations: Vec<Violation>,
    },
    /// A declared response schema could not be compiled.
    #[error("schema for {operation} failed to compile: {message}")]
    InvalidSchema {
        /// Operation label.
        operation: String,
        /// Compiler message.
        message: String,
    },
    /// A known deviation no longer occurs.
    #[error("{operation} now conforms to its schema; remove the known deviation ({reason})")]
    StaleDeviation {
        /// Operation label.
        operation: String,
        /// Reason recorded with the allowance.
        reason: String,
    },
    /// The body could not be decoded.
    #[error("failed to decode response of {operation}: {message}")]
    Decode {
        /// Operation label.
        operation: String,
        /// Failure description.
        message: String,
    },
}

impl CallError {
    /// Returns the response status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError {
                status, ..
            }
            | Self::UndocumentedStatus {
                status, ..
            }
            | Self::ContentType {
                status, ..
            }
            | Self::SchemaViolation {
                status, ..
            } => Some(*status),
            Self::UnexpectedStatus {
                actual, ..
            } => Some(*actual),
            _ => None,
        }
    }

    /// Returns true when no response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Build(_) | Self::Encode { .. } | Self::Transport { .. })
    }

    /// Returns true for violations a [`KnownDeviation`] may accept.
    #[must_use]
    pub const fn is_deviation(&self) -> bool {
        matches!(
            self,
            Self::SchemaViolation { .. } | Self::ContentType { .. } | Self::UndocumentedStatus { .. }
        )
    }
}

// ============================================================================
// SECTION: Known Deviations
// ============================================================================

/// Explicit allowance for a documented response/schema divergence.
///
/// # Invariants
/// - The reason names the tracked defect so the allowance can be found later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownDeviation {
    /// Description of the divergence.
    reason: String,
}

impl KnownDeviation {
    /// Creates an allowance with a reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Returns the recorded reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// How a response is checked after the exchange.
enum Validation<'a> {
    /// No checks.
    None,
    /// All checks; violations are errors.
    Strict,
    /// All checks; deviations are accepted and conformance is an error.
    Allowing(&'a KnownDeviation),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking API client with contract validation and call auditing.
pub struct ApiClient {
    /// Underlying HTTP client.
    http: Client,
    /// Active settings.
    settings: HarnessSettings,
    /// Audit sink receiving one event per exchange.
    audit: Arc<dyn CallAuditSink>,
}

impl ApiClient {
    /// Builds a client from validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Build`] when the HTTP client cannot be created.
    pub fn new(settings: HarnessSettings, audit: Arc<dyn CallAuditSink>) -> Result<Self, CallError> {
        let redirect = if settings.follow_redirects { Policy::limited(10) } else { Policy::none() };
        let http = Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .user_agent(settings.user_agent.clone())
            .redirect(redirect)
            .build()
            .map_err(|err| CallError::Build(err.to_string()))?;
        Ok(Self {
            http,
            settings,
            audit,
        })
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> &Arc<dyn CallAuditSink> {
        &self.audit
    }

    /// Sends the case without any checks.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] when the request cannot be encoded or the
    /// exchange fails.
    pub fn call(&self, case: &Case) -> Result<ApiResponse, CallError> {
        self.execute(case, &Validation::None)
    }

    /// Sends the case and validates the response against its contract.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] on transport failure or the first contract
    /// violation.
    pub fn call_and_validate(&self, case: &Case) -> Result<ApiResponse, CallError> {
        self.execute(case, &Validation::Strict)
    }

    /// Sends the case, accepting a known schema deviation.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::StaleDeviation`] when the response conforms, or
    /// any error that is not a contract deviation.
    pub fn call_allowing(
        &self,
        case: &Case,
        deviation: &KnownDeviation,
    ) -> Result<ApiResponse, CallError> {
        self.execute(case, &Validation::Allowing(deviation))
    }

    /// Runs one exchange, applies checks, and records the audit event.
    fn execute(&self, case: &Case, validation: &Validation<'_>) -> Result<ApiResponse, CallError> {
        let started = Instant::now();
        let result = self.send(case).and_then(|response| apply_validation(case, response, validation));
        self.record(
            Some(case.operation().id.as_str()),
            case.method(),
            case.url().as_str(),
            &result,
            started.elapsed(),
        );
        result
    }

    /// Builds and sends the request for a case.
    fn send(&self, case: &Case) -> Result<ApiResponse, CallError> {
        let operation_id = case.operation().id.clone();
        let mut builder = self.http.request(case.method().clone(), case.url().clone());
        builder = builder.header(ACCEPT, "application/json");
        for (name, value) in case.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| CallError::Encode {
                operation: operation_id.clone(),
                message: format!("invalid header name: {err}"),
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| CallError::Encode {
                operation: operation_id.clone(),
                message: format!("invalid value for header {name}"),
            })?;
            builder = builder.header(name, value);
        }
        if let Some(token) = case.bearer() {
            let mut value = HeaderValue::from_str(&token.bearer_value()).map_err(|_| CallError::Encode {
                operation: operation_id.clone(),
                message: "invalid bearer token".to_string(),
            })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = case.body() {
            let encoded = encode_body(case.media_type(), body).map_err(|message| CallError::Encode {
                operation: operation_id.clone(),
                message,
            })?;
            builder = builder.header(CONTENT_TYPE, case.media_type()).body(encoded);
        }
        let label = operation_id.clone();
        self.exchange(Some(operation_id), label, case.method().clone(), case.url().clone(), builder)
    }

    /// Sends a prepared request and reads the body within the size limit.
    fn exchange(
        &self,
        operation_id: Option<String>,
        label: String,
        method: Method,
        url: Url,
        builder: RequestBuilder,
    ) -> Result<ApiResponse, CallError> {
        let mut response = builder.send().map_err(|err| CallError::Transport {
            operation: label.clone(),
            message: describe_transport_error(&err),
        })?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = read_response_limited(&mut response, self.settings.max_response_bytes)
            .map_err(|message| CallError::Transport {
                operation: label,
                message,
            })?;
        Ok(ApiResponse {
            operation_id,
            method,
            url,
            status,
            headers,
            body,
            conformance: Conformance::Unvalidated,
            deviation: None,
        })
    }

    /// Emits the audit event for a finished exchange.
    fn record(
        &self,
        operation_id: Option<&str>,
        method: &Method,
        url: &str,
        result: &Result<ApiResponse, CallError>,
        elapsed: Duration,
    ) {
        let (status, outcome, error) = match result {
            Ok(response) => {
                let outcome = match response.conformance() {
                    Conformance::Unvalidated => CallOutcome::Unvalidated,
                    Conformance::Conformant => CallOutcome::Conformant,
                    Conformance::KnownDeviation => CallOutcome::KnownDeviation,
                };
                (Some(response.status()), outcome, response.deviation().map(str::to_string))
            }
            Err(err) => {
                let outcome = if err.is_transport() {
                    CallOutcome::TransportError
                } else {
                    CallOutcome::ContractViolation
                };
                (err.status(), outcome, Some(err.to_string()))
            }
        };
        let event = CallAuditEvent::new(CallAuditEventParams {
            operation_id: operation_id.map(str::to_string),
            method: method.to_string(),
            url: url.to_string(),
            status,
            outcome,
            elapsed_ms: elapsed.as_millis(),
            error,
        });
        self.audit.record_call(&event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies the requested validation mode to a received response.
fn apply_validation(
    case: &Case,
    mut response: ApiResponse,
    validation: &Validation<'_>,
) -> Result<ApiResponse, CallError> {
    match validation {
        Validation::None => Ok(response),
        Validation::Strict => {
            checks::check_response(case, &response)?;
            response.conformance = Conformance::Conformant;
            Ok(response)
        }
        Validation::Allowing(deviation) => match checks::check_response(case, &response) {
            Ok(()) => Err(CallError::StaleDeviation {
                operation: case.operation().id.clone(),
                reason: deviation.reason().to_string(),
            }),
            Err(err) if err.is_deviation() => {
                response.conformance = Conformance::KnownDeviation;
                response.deviation = Some(format!("{} ({err})", deviation.reason()));
                Ok(response)
            }
            Err(err) => Err(err),
        },
    }
}

/// Encodes a request body for its media type.
fn encode_body(media_type: &str, body: &Value) -> Result<Vec<u8>, String> {
    let essence = media_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if essence == "application/x-www-form-urlencoded" {
        let Value::Object(fields) = body else {
            return Err("form bodies must be objects".to_string());
        };
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            serializer.append_pair(key, &text);
        }
        return Ok(serializer.finish().into_bytes());
    }
    serde_json::to_vec(body).map_err(|err| err.to_string())
}

/// Summarises a transport error without request details.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_redirect() {
        "redirect policy violated".to_string()
    } else if err.is_body() || err.is_decode() {
        "failed to read response body".to_string()
    } else {
        "request failed".to_string()
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, String> {
    let expected_len = response.content_length();
    let max_bytes_u64 =
        u64::try_from(max_bytes).map_err(|_| "response size limit exceeds u64".to_string())?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err("response exceeds size limit".to_string());
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle.read_to_end(&mut buf).map_err(|_| "failed to read response".to_string())?;
    if buf.len() > max_bytes {
        return Err("response exceeds size limit".to_string());
    }
    Ok(buf)
}
