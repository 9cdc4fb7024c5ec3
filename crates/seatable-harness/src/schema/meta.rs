// crates/seatable-harness/src/schema/meta.rs
// ============================================================================
// Module: OpenAPI Meta-Schema
// Description: Structural JSON Schema for OpenAPI 3.x documents.
// Purpose: Reject malformed API descriptions before any operation is used.
// Dependencies: jsonschema, serde_json
// ============================================================================

//! ## Overview
//! A compact structural schema covering the parts of an OpenAPI 3.x document
//! the harness reads: `openapi`, `info`, `paths`, operations, parameters,
//! request bodies, responses, and `components`. Semantic checks that cannot
//! be expressed structurally live in the document module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of structural errors reported per document.
const MAX_REPORTED_ERRORS: usize = 10;

// ============================================================================
// SECTION: Meta-Schema
// ============================================================================

/// Builds the structural meta-schema.
fn meta_schema() -> Value {
    json!({
        "type": "object",
        "required": ["openapi", "info", "paths"],
        "properties": {
            "openapi": { "type": "string" },
            "info": {
                "type": "object",
                "required": ["title", "version"],
                "properties": {
                    "title": { "type": "string" },
                    "version": { "type": "string" }
                }
            },
            "servers": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["url"],
                    "properties": { "url": { "type": "string" } }
                }
            },
            "paths": {
                "type": "object",
                "propertyNames": { "pattern": "^/" },
                "additionalProperties": { "$ref": "#/$defs/pathItem" }
            },
            "components": {
                "type": "object",
                "properties": {
                    "schemas": { "type": "object" },
                    "parameters": {
                        "type": "object",
                        "additionalProperties": { "$ref": "#/$defs/parameterOrRef" }
                    },
                    "requestBodies": { "type": "object" },
                    "responses": { "type": "object" }
                }
            }
        },
        "$defs": {
            "pathItem": {
                "type": "object",
                "properties": {
                    "parameters": {
                        "type": "array",
                        "items": { "$ref": "#/$defs/parameterOrRef" }
                    },
                    "get": { "$ref": "#/$defs/operation" },
                    "put": { "$ref": "#/$defs/operation" },
                    "post": { "$ref": "#/$defs/operation" },
                    "delete": { "$ref": "#/$defs/operation" },
                    "options": { "$ref": "#/$defs/operation" },
                    "head": { "$ref": "#/$defs/operation" },
                    "patch": { "$ref": "#/$defs/operation" },
                    "trace": { "$ref": "#/$defs/operation" }
                }
            },
            "operation": {
                "type": "object",
                "required": ["responses"],
                "properties": {
                    "operationId": { "type": "string", "minLength": 1 },
                    "parameters": {
                        "type": "array",
                        "items": { "$ref": "#/$defs/parameterOrRef" }
                    },
                    "requestBody": {
                        "type": "object",
                        "properties": {
                            "required": { "type": "boolean" },
                            "content": { "type": "object" }
                        }
                    },
                    "responses": {
                        "type": "object",
                        "minProperties": 1,
                        "propertyNames": { "pattern": "^([1-5][0-9X]{2}|default)$" },
                        "additionalProperties": { "$ref": "#/$defs/responseOrRef" }
                    }
                }
            },
            "parameterOrRef": {
                "type": "object",
                "if": { "required": ["$ref"] },
                "then": { "properties": { "$ref": { "type": "string" } } },
                "else": {
                    "required": ["name", "in"],
                    "properties": {
                        "name": { "type": "string", "minLength": 1 },
                        "in": { "enum": ["path", "query", "header", "cookie"] },
                        "required": { "type": "boolean" }
                    },
                    "if": { "properties": { "in": { "const": "path" } } },
                    "then": {
                        "required": ["required"],
                        "properties": { "required": { "const": true } }
                    }
                }
            },
            "responseOrRef": {
                "type": "object",
                "properties": {
                    "$ref": { "type": "string" },
                    "content": {
                        "type": "object",
                        "additionalProperties": { "type": "object" }
                    }
                }
            }
        }
    })
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Checks a document against the structural meta-schema.
///
/// # Errors
///
/// Returns a summary of the first structural errors, each with its location.
pub(super) fn check_structure(document: &Value) -> Result<(), String> {
    let schema = meta_schema();
    let validator: Validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|err| format!("meta-schema failed to compile: {err}"))?;
    let errors: Vec<String> = validator
        .iter_errors(document)
        .take(MAX_REPORTED_ERRORS)
        .map(|err| format!("{} at '{}'", err.masked(), err.instance_path()))
        .collect();
    if errors.is_empty() { Ok(()) } else { Err(errors.join("; ")) }
}
