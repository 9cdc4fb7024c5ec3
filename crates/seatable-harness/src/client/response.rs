// crates/seatable-harness/src/client/response.rs
// ============================================================================
// Module: API Responses
// Description: Structured result of one HTTP exchange.
// Purpose: Expose status, headers, and body with typed accessors.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`ApiResponse`] owns the fully read body. Its `Debug` output reports the
//! body length only, because login and token responses carry credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::CallError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Validation state of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conformance {
    /// Returned by [`crate::ApiClient::call`]; nothing was checked.
    Unvalidated,
    /// The response matched its declared contract.
    Conformant,
    /// The response violated its contract under an explicit allowance.
    KnownDeviation,
}

/// Response of one HTTP exchange.
#[derive(Clone)]
pub struct ApiResponse {
    /// Operation identifier, `None` for uploads.
    pub(crate) operation_id: Option<String>,
    /// Request method.
    pub(crate) method: Method,
    /// Request URL.
    pub(crate) url: Url,
    /// Status code.
    pub(crate) status: u16,
    /// Response headers.
    pub(crate) headers: HeaderMap,
    /// Response body.
    pub(crate) body: Vec<u8>,
    /// Validation state.
    pub(crate) conformance: Conformance,
    /// Violation accepted under a known deviation.
    pub(crate) deviation: Option<String>,
}

impl ApiResponse {
    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value when present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the operation identifier.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    /// Returns the validation state.
    #[must_use]
    pub const fn conformance(&self) -> Conformance {
        self.conformance
    }

    /// Returns the accepted violation summary for known deviations.
    #[must_use]
    pub fn deviation(&self) -> Option<&str> {
        self.deviation.as_deref()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Decode`] when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, CallError> {
        self.json_as()
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Decode`] when decoding fails.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, CallError> {
        serde_json::from_slice(&self.body).map_err(|err| CallError::Decode {
            operation: self.label(),
            message: describe_json_error(&err),
        })
    }

    /// Decodes the body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Decode`] when the body is not UTF-8.
    pub fn text(&self) -> Result<&str, CallError> {
        std::str::from_utf8(&self.body).map_err(|err| CallError::Decode {
            operation: self.label(),
            message: err.to_string(),
        })
    }

    /// Fails unless the status equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::UnexpectedStatus`] on mismatch.
    pub fn expect_status(&self, expected: u16) -> Result<&Self, CallError> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(CallError::UnexpectedStatus {
                operation: self.label(),
                expected: expected.to_string(),
                actual: self.status,
            })
        }
    }

    /// Label used in error messages.
    fn label(&self) -> String {
        self.operation_id.clone().unwrap_or_else(|| format!("{} {}", self.method, self.url.path()))
    }
}

/// Describes a decode failure without echoing body content.
fn describe_json_error(err: &serde_json::Error) -> String {
    let class = match err.classify() {
        serde_json::error::Category::Io => "io",
        serde_json::error::Category::Syntax => "syntax",
        serde_json::error::Category::Data => "data",
        serde_json::error::Category::Eof => "eof",
    };
    format!("json {class} error at line {} column {}", err.line(), err.column())
}

impl fmt::Debug for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("operation_id", &self.operation_id)
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("content_type", &self.content_type())
            .field("body_len", &self.body.len())
            .field("conformance", &self.conformance)
            .finish_non_exhaustive()
    }
}
