// crates/seatable-harness/src/case/tests.rs
// ============================================================================
// Module: Case Synthesizer Tests
// Description: Unit tests for value synthesis, merging, and URL rendering.
// Purpose: Keep synthesized requests deterministic and schema-valid.
// Dependencies: seatable-harness, serde_json
// ============================================================================

//! ## Overview
//! Synthesis is checked against hand-written expectations rather than a
//! validator so that regressions in the chosen values are visible.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use serde_json::json;
use url::Url;

use super::CaseError;
use super::CaseOverrides;
use super::encode::build_url;
use super::encode::query_pairs;
use super::make_case;
use super::merge_values;
use super::synthesize;
use crate::schema::Operation;
use crate::schema::SchemaHandle;
use crate::secret::Secret;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn operation(id: &str) -> Arc<Operation> {
    let root = json!({
        "openapi": "3.0.3",
        "info": {"title": "cases", "version": "1.0"},
        "paths": {
            "/api/v2/dtables/{base_uuid}/rows/": {
                "parameters": [
                    {"name": "base_uuid", "in": "path", "required": true, "schema": {"type": "string", "format": "uuid"}}
                ],
                "get": {
                    "operationId": "listRows",
                    "parameters": [
                        {"name": "table_name", "in": "query", "required": true, "schema": {"type": "string", "default": "Table1"}},
                        {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                        {"name": "Authorization", "in": "header", "required": true, "schema": {"type": "string"}}
                    ],
                    "responses": {"200": {"description": "ok"}}
                },
                "post": {
                    "operationId": "appendRows",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {
                            "type": "object",
                            "required": ["table_name", "rows"],
                            "properties": {
                                "table_name": {"type": "string"},
                                "rows": {"type": "array", "items": {"type": "object"}},
                                "apply_default": {"type": "boolean"}
                            }
                        }}}
                    },
                    "responses": {"200": {"description": "ok"}}
                }
            }
        }
    });
    let handle = SchemaHandle::from_value("cases", &root, "https://cloud.example.test/")
        .expect("valid document");
    handle.get_operation(id).expect("operation")
}

// ============================================================================
// SECTION: Synthesis Tests
// ============================================================================

#[test]
fn literals_take_priority_in_order() {
    assert_eq!(synthesize(&json!({"const": 3, "enum": [1], "default": 2})), json!(3));
    assert_eq!(synthesize(&json!({"enum": [null, "b"], "default": "c"})), json!("b"));
    assert_eq!(synthesize(&json!({"type": "string", "default": "c", "example": "d"})), json!("c"));
    assert_eq!(synthesize(&json!({"type": "string", "example": "d"})), json!("d"));
    assert_eq!(synthesize(&json!({"type": "string", "examples": ["e", "f"]})), json!("e"));
}

#[test]
fn strings_honour_format_and_length() {
    assert_eq!(synthesize(&json!({"type": "string"})), json!("a"));
    assert_eq!(synthesize(&json!({"type": "string", "minLength": 4})), json!("aaaa"));
    assert_eq!(synthesize(&json!({"type": "string", "format": "date"})), json!("2030-01-01"));
    assert_eq!(synthesize(&json!({"type": ["null", "string"]})), json!("a"));
}

#[test]
fn numbers_honour_bounds() {
    assert_eq!(synthesize(&json!({"type": "integer"})), json!(0));
    assert_eq!(synthesize(&json!({"type": "integer", "minimum": 5})), json!(5));
    assert_eq!(
        synthesize(&json!({"type": "integer", "minimum": 5, "exclusiveMinimum": true})),
        json!(6)
    );
    assert_eq!(synthesize(&json!({"type": "integer", "exclusiveMinimum": 5})), json!(6));
    assert_eq!(synthesize(&json!({"type": "integer", "minimum": 1, "multipleOf": 4})), json!(4));
    assert_eq!(synthesize(&json!({"type": "integer", "maximum": -3})), json!(-3));
    assert_eq!(synthesize(&json!({"type": "number", "minimum": 0.5})), json!(0.5));
}

#[test]
fn objects_include_only_required_properties() {
    let schema = json!({
        "type": "object",
        "required": ["name", "rows"],
        "properties": {
            "name": {"type": "string"},
            "rows": {"type": "array", "minItems": 1, "items": {"type": "boolean"}},
            "optional": {"type": "integer"}
        }
    });
    assert_eq!(synthesize(&schema), json!({"name": "a", "rows": [false]}));
}

#[test]
fn composition_keywords_are_followed() {
    let all_of = json!({"allOf": [
        {"type": "object", "required": ["a"], "properties": {"a": {"type": "integer"}}},
        {"type": "object", "required": ["b"], "properties": {"b": {"type": "boolean"}}}
    ]});
    assert_eq!(synthesize(&all_of), json!({"a": 0, "b": false}));
    let any_of = json!({"anyOf": [{"type": "null"}, {"type": "string", "minLength": 2}]});
    assert_eq!(synthesize(&any_of), json!("aa"));
}

#[test]
fn synthesis_terminates_on_deep_schemas() {
    let mut schema = json!({"type": "string"});
    for _ in 0 .. 100 {
        schema = json!({"type": "object", "required": ["x"], "properties": {"x": schema}});
    }
    let value = synthesize(&schema);
    assert!(value.is_object());
}

#[test]
fn synthesis_is_deterministic() {
    let schema = json!({"type": "object", "required": ["id"], "properties": {"id": {"type": "string"}}});
    assert_eq!(synthesize(&schema), synthesize(&schema));
}

// ============================================================================
// SECTION: Merge Tests
// ============================================================================

#[test]
fn merge_replaces_scalars_and_arrays() {
    let base = json!({"a": {"x": 1, "y": 2}, "list": [1, 2], "keep": true});
    let overlay = json!({"a": {"y": 3}, "list": [9]});
    assert_eq!(
        merge_values(base, overlay),
        json!({"a": {"x": 1, "y": 3}, "list": [9], "keep": true})
    );
}

// ============================================================================
// SECTION: Encoding Tests
// ============================================================================

#[test]
fn path_values_are_percent_encoded() {
    let base = Url::parse("https://cloud.example.test/").expect("url");
    let mut values = BTreeMap::new();
    values.insert("base_name".to_string(), "my base/1".to_string());
    let url = build_url(&base, "/api/v2/dtables/{base_name}/", &values, &[]).expect("url");
    assert_eq!(url.as_str(), "https://cloud.example.test/api/v2/dtables/my%20base%2F1/");
}

#[test]
fn missing_path_value_is_reported() {
    let base = Url::parse("https://cloud.example.test/").expect("url");
    let err = build_url(&base, "/rows/{row_id}", &BTreeMap::new(), &[]).expect_err("missing");
    assert_eq!(err, CaseError::MissingPathParameter("row_id".to_string()));
}

#[test]
fn query_arrays_repeat_and_nulls_drop() {
    let pairs = query_pairs("id", &json!(["a", null, 2])).expect("pairs");
    assert_eq!(pairs, vec![
        ("id".to_string(), "a".to_string()),
        ("id".to_string(), "2".to_string()),
    ]);
    assert!(query_pairs("id", &Value::Null).expect("null").is_empty());
    assert!(query_pairs("id", &json!({"a": 1})).is_err());
}

// ============================================================================
// SECTION: Case Tests
// ============================================================================

#[test]
fn required_parameters_are_synthesized() {
    let case = make_case(&operation("listRows"), CaseOverrides::new()).expect("case");
    assert_eq!(
        case.url().as_str(),
        "https://cloud.example.test/api/v2/dtables/00000000-0000-4000-8000-000000000000/rows/?table_name=Table1"
    );
    assert_eq!(case.headers().get("authorization").map(String::as_str), Some("a"));
    assert!(case.body().is_none());
}

#[test]
fn overrides_win_and_bearer_replaces_authorization() {
    let token = Secret::new("tok-123");
    let overrides = CaseOverrides::new()
        .path_param("base_uuid", "b1")
        .query("table_name", "Contacts")
        .query("limit", 10)
        .bearer(&token);
    let case = make_case(&operation("listRows"), overrides).expect("case");
    assert_eq!(
        case.url().as_str(),
        "https://cloud.example.test/api/v2/dtables/b1/rows/?limit=10&table_name=Contacts"
    );
    assert!(case.headers().get("authorization").is_none());
    assert_eq!(case.bearer(), Some(&token));
    assert!(!format!("{case:?}").contains("tok-123"));
}

#[test]
fn undeclared_path_override_is_rejected() {
    let overrides = CaseOverrides::new().path_param("row_id", "r1");
    let err = make_case(&operation("listRows"), overrides).expect_err("unknown path param");
    assert_eq!(err, CaseError::UnknownPathParameter("row_id".to_string()));
}

#[test]
fn supplied_body_is_merged_over_synthesized_body() {
    let overrides = CaseOverrides::new()
        .path_param("base_uuid", "b1")
        .body(json!({"table_name": "Table1", "apply_default": true}))
        .expect_status(200);
    let case = make_case(&operation("appendRows"), overrides).expect("case");
    assert_eq!(
        case.body(),
        Some(&json!({"table_name": "Table1", "rows": [], "apply_default": true}))
    );
    assert_eq!(case.media_type(), "application/json");
    assert_eq!(case.expected_status(), Some(200));
    assert_eq!(case.method(), &reqwest::Method::POST);
}
