// crates/seatable-harness/src/case/encode.rs
// ============================================================================
// Module: Parameter Encoding
// Description: Rendering of parameter values into URLs and headers.
// Purpose: Produce a concrete request URL from a template and values.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! Path parameters become single percent-encoded segments. Query values are
//! rendered as JSON scalars (`true`, `false`, `3`, `text`), arrays explode to
//! repeated keys, and objects are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use url::Url;

use super::CaseError;

// ============================================================================
// SECTION: Scalars
// ============================================================================

/// Renders a scalar parameter value.
///
/// # Errors
///
/// Returns [`CaseError::UnsupportedValue`] for arrays and objects.
pub(super) fn render_scalar(name: &str, value: &Value) -> Result<String, CaseError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(CaseError::UnsupportedValue {
            name: name.to_string(),
            reason: "expected a scalar value".to_string(),
        }),
    }
}

/// Expands a query value into `(key, value)` pairs.
///
/// # Errors
///
/// Returns [`CaseError::UnsupportedValue`] for objects and nested arrays.
pub(super) fn query_pairs(name: &str, value: &Value) -> Result<Vec<(String, String)>, CaseError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| render_scalar(name, item).map(|text| (name.to_string(), text)))
            .collect(),
        Value::Object(_) => Err(CaseError::UnsupportedValue {
            name: name.to_string(),
            reason: "object query parameters are not supported".to_string(),
        }),
        scalar => Ok(vec![(name.to_string(), render_scalar(name, scalar)?)]),
    }
}

// ============================================================================
// SECTION: URL Construction
// ============================================================================

/// Builds the request URL from a base URL, path template, and values.
///
/// # Errors
///
/// Returns [`CaseError`] when a placeholder has no value or the base URL
/// cannot carry a path.
pub(super) fn build_url(
    base_url: &Url,
    template: &str,
    path_values: &BTreeMap<String, String>,
    query: &[(String, String)],
) -> Result<Url, CaseError> {
    let mut segments = Vec::new();
    for raw in template.trim_start_matches('/').split('/') {
        segments.push(fill_segment(raw, path_values)?);
    }
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| CaseError::InvalidUrl("base url cannot carry a path".to_string()))?;
        path.pop_if_empty();
        path.extend(segments.iter().map(String::as_str));
    }
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Substitutes every `{name}` placeholder inside one path segment.
fn fill_segment(raw: &str, path_values: &BTreeMap<String, String>) -> Result<String, CaseError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1 ..].find('}') else {
            break;
        };
        let name = &rest[start + 1 .. start + 1 + len];
        let value = path_values
            .get(name)
            .ok_or_else(|| CaseError::MissingPathParameter(name.to_string()))?;
        out.push_str(&rest[.. start]);
        out.push_str(value);
        rest = &rest[start + len + 2 ..];
    }
    out.push_str(rest);
    Ok(out)
}
