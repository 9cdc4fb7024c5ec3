// crates/seatable-harness/src/client/checks.rs
// ============================================================================
// Module: Response Checks
// Description: Contract checks applied to a received response.
// Purpose: Report the first contract violation with its structural location.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Checks run in a fixed order and stop at the first failure:
//! 1. the status is not a server error,
//! 2. the status matches the case's expectation (or is 2xx),
//! 3. the status is declared (exact, `NXX` class, or `default`),
//! 4. a non-empty body carries a declared content type,
//! 5. a JSON body conforms to the declared schema.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use super::CallError;
use super::Violation;
use super::response::ApiResponse;
use crate::case::Case;
use crate::schema::MediaTypeSpec;
use crate::schema::Operation;
use crate::schema::is_json_media_type;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of schema violations reported per response.
const MAX_REPORTED_VIOLATIONS: usize = 20;

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Validates `response` against the contract of `case`.
///
/// # Errors
///
/// Returns the first failing check as a [`CallError`].
pub(super) fn check_response(case: &Case, response: &ApiResponse) -> Result<(), CallError> {
    let operation = case.operation();
    let status = response.status();
    if status >= 500 {
        return Err(CallError::ServerError {
            operation: operation.id.clone(),
            status,
        });
    }
    match case.expected_status() {
        Some(expected) if expected != status => {
            return Err(CallError::UnexpectedStatus {
                operation: operation.id.clone(),
                expected: expected.to_string(),
                actual: status,
            });
        }
        None if !(200 .. 300).contains(&status) => {
            return Err(CallError::UnexpectedStatus {
                operation: operation.id.clone(),
                expected: "2xx".to_string(),
                actual: status,
            });
        }
        _ => {}
    }
    let Some((_, spec)) = operation.response_for(status) else {
        return Err(CallError::UndocumentedStatus {
            operation: operation.id.clone(),
            status,
        });
    };
    if response.body().is_empty() || spec.content.is_empty() {
        return Ok(());
    }
    let content_type = response.content_type().unwrap_or_default();
    let Some(media) = spec.content.iter().find(|media| media_matches(&media.media_type, content_type))
    else {
        return Err(CallError::ContentType {
            operation: operation.id.clone(),
            status,
            content_type: if content_type.is_empty() {
                "<missing>".to_string()
            } else {
                content_type.to_string()
            },
        });
    };
    check_schema(operation, media, content_type, response)
}

/// Validates a JSON body against the media type's schema.
fn check_schema(
    operation: &Operation,
    media: &MediaTypeSpec,
    content_type: &str,
    response: &ApiResponse,
) -> Result<(), CallError> {
    let Some(schema) = &media.schema else {
        return Ok(());
    };
    if !is_json_media_type(content_type) {
        return Ok(());
    }
    let status = response.status();
    let Ok(instance) = serde_json::from_slice::<Value>(response.body()) else {
        return Err(CallError::SchemaViolation {
            operation: operation.id.clone(),
            status,
            violations: vec![Violation {
                location: String::new(),
                schema_path: String::new(),
                message: "body is not valid JSON".to_string(),
            }],
        });
    };
    let validator = jsonschema::options()
        .with_draft(operation.draft.as_jsonschema())
        .build(schema)
        .map_err(|err| CallError::InvalidSchema {
            operation: operation.id.clone(),
            message: err.masked().to_string(),
        })?;
    let violations: Vec<Violation> = validator
        .iter_errors(&instance)
        .take(MAX_REPORTED_VIOLATIONS)
        .map(|err| Violation {
            location: err.instance_path().to_string(),
            schema_path: err.schema_path().to_string(),
            message: err.masked().to_string(),
        })
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CallError::SchemaViolation {
            operation: operation.id.clone(),
            status,
            violations,
        })
    }
}

/// Returns true when an actual content type satisfies a declared media type.
pub(super) fn media_matches(declared: &str, actual: &str) -> bool {
    let actual = actual.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let declared = declared.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if actual.is_empty() {
        return false;
    }
    if declared == "*/*" {
        return true;
    }
    match declared.strip_suffix("/*") {
        Some(kind) => actual.split('/').next() == Some(kind),
        None => declared == actual,
    }
}
