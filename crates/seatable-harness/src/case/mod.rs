// crates/seatable-harness/src/case/mod.rs
// ============================================================================
// Module: Case Synthesizer
// Description: Concrete requests materialised from an operation.
// Purpose: Combine explicit overrides with schema-driven defaults.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! [`make_case`] turns an [`Operation`] plus [`CaseOverrides`] into a [`Case`]:
//! a fully rendered URL, headers, optional bearer credential, and optional
//! JSON body. Required parameters the caller did not supply are synthesized
//! from their schemas; optional ones are omitted. A body is synthesized only
//! when the operation requires one, and a supplied body is merged over it.
//! Synthesis is pure and performs no I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::schema::Operation;
use crate::schema::ParameterLocation;
use crate::secret::Secret;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod encode;
mod merge;
mod synth;

#[cfg(test)]
mod tests;

pub use merge::merge_values;
pub use synth::synthesize;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Case construction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaseError {
    /// An override names a path parameter the operation does not declare.
    #[error("unknown path parameter: {0}")]
    UnknownPathParameter(String),
    /// A path placeholder has no value.
    #[error("missing path parameter: {0}")]
    MissingPathParameter(String),
    /// A parameter value cannot be rendered.
    #[error("unsupported value for parameter {name}: {reason}")]
    UnsupportedValue {
        /// Parameter name.
        name: String,
        /// Reason the value was rejected.
        reason: String,
    },
    /// The request URL could not be built.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Explicit request fields supplied by a test.
#[derive(Clone, Default)]
pub struct CaseOverrides {
    /// Path parameter values.
    path_parameters: BTreeMap<String, Value>,
    /// Query parameter values.
    query: BTreeMap<String, Value>,
    /// Header values.
    headers: BTreeMap<String, String>,
    /// Request body.
    body: Option<Value>,
    /// Bearer credential.
    bearer: Option<Secret>,
    /// Expected response status.
    expected_status: Option<u16>,
}

impl CaseOverrides {
    /// Creates an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a path parameter.
    #[must_use]
    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.path_parameters.insert(name.into(), value.into());
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets a plain header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches a bearer credential.
    #[must_use]
    pub fn bearer(mut self, token: &Secret) -> Self {
        self.bearer = Some(token.clone());
        self
    }

    /// Declares the status the validated call paths must observe.
    #[must_use]
    pub const fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }
}

impl fmt::Debug for CaseOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseOverrides")
            .field("path_parameters", &self.path_parameters.keys().collect::<Vec<_>>())
            .field("query", &self.query.keys().collect::<Vec<_>>())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body", &self.body.as_ref().map(|_| "<body>"))
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("expected_status", &self.expected_status)
            .finish()
    }
}

// ============================================================================
// SECTION: Case
// ============================================================================

/// A concrete request for one operation.
///
/// # Invariants
/// - `url` has every path placeholder substituted.
/// - `Debug` output never contains the body or the credential.
#[derive(Clone)]
pub struct Case {
    /// Operation the case targets.
    operation: Arc<Operation>,
    /// Fully rendered request URL.
    url: Url,
    /// Plain headers (lowercase names).
    headers: BTreeMap<String, String>,
    /// Bearer credential.
    bearer: Option<Secret>,
    /// Request body.
    body: Option<Value>,
    /// Media type for the body.
    media_type: String,
    /// Expected response status.
    expected_status: Option<u16>,
}

impl Case {
    /// Returns the target operation.
    #[must_use]
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.operation.method
    }

    /// Returns the rendered URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the plain headers.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the bearer credential.
    #[must_use]
    pub const fn bearer(&self) -> Option<&Secret> {
        self.bearer.as_ref()
    }

    /// Returns the request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns the body media type.
    #[must_use]
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Returns the expected response status, if declared.
    #[must_use]
    pub const fn expected_status(&self) -> Option<u16> {
        self.expected_status
    }

    /// Returns a copy of the case carrying `token` as bearer credential.
    #[must_use]
    pub fn with_bearer(mut self, token: &Secret) -> Self {
        self.bearer = Some(token.clone());
        self
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("operation_id", &self.operation.id)
            .field("method", &self.operation.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body.as_ref().map(|_| "<body>"))
            .field("media_type", &self.media_type)
            .field("expected_status", &self.expected_status)
            .finish()
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Materialises a request for `operation`.
///
/// # Errors
///
/// Returns [`CaseError`] when an override names an undeclared path parameter,
/// a value cannot be rendered, or the URL cannot be built.
pub fn make_case(operation: &Arc<Operation>, overrides: CaseOverrides) -> Result<Case, CaseError> {
    for name in overrides.path_parameters.keys() {
        if operation.parameter(name, ParameterLocation::Path).is_none() {
            return Err(CaseError::UnknownPathParameter(name.clone()));
        }
    }

    let mut path_values = BTreeMap::new();
    let mut query_values = overrides.query;
    let mut headers = BTreeMap::new();
    for parameter in &operation.parameters {
        match parameter.location {
            ParameterLocation::Path => {
                let value = overrides
                    .path_parameters
                    .get(&parameter.name)
                    .cloned()
                    .unwrap_or_else(|| synthesize(&parameter.schema));
                path_values
                    .insert(parameter.name.clone(), encode::render_scalar(&parameter.name, &value)?);
            }
            ParameterLocation::Query => {
                if parameter.required && !query_values.contains_key(&parameter.name) {
                    query_values.insert(parameter.name.clone(), synthesize(&parameter.schema));
                }
            }
            ParameterLocation::Header => {
                let key = parameter.name.to_ascii_lowercase();
                if parameter.required
                    && !overrides.headers.contains_key(&key)
                    && !(key == "authorization" && overrides.bearer.is_some())
                {
                    let value = synthesize(&parameter.schema);
                    headers.insert(key, encode::render_scalar(&parameter.name, &value)?);
                }
            }
            ParameterLocation::Cookie => {}
        }
    }
    headers.extend(overrides.headers);

    let mut query = Vec::new();
    for (name, value) in &query_values {
        query.extend(encode::query_pairs(name, value)?);
    }
    let url = encode::build_url(&operation.base_url, &operation.path_template, &path_values, &query)?;

    let synthesized = operation
        .request_body
        .as_ref()
        .filter(|spec| spec.required)
        .map(|spec| synthesize(&spec.schema));
    let body = match (synthesized, overrides.body) {
        (Some(base), Some(overlay)) => Some(merge_values(base, overlay)),
        (base, overlay) => overlay.or(base),
    };
    let media_type = operation
        .request_body
        .as_ref()
        .map_or_else(|| "application/json".to_string(), |spec| spec.media_type.clone());

    Ok(Case {
        operation: Arc::clone(operation),
        url,
        headers,
        bearer: overrides.bearer,
        body,
        media_type,
        expected_status: overrides.expected_status,
    })
}
