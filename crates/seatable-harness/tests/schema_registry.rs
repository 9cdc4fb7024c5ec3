// crates/seatable-harness/tests/schema_registry.rs
// ============================================================================
// Module: Schema Registry Integration Tests
// Description: Loading API description documents from disk.
// Purpose: Ensure invalid documents are rejected before any operation is used.
// Dependencies: seatable-harness
// ============================================================================

//! ## Overview
//! Loads the YAML fixtures under `tests/fixtures` through the public API.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

mod common;

use std::error::Error;

use seatable_harness::SchemaError;
use seatable_harness::SchemaHandle;
use seatable_harness::SchemaSet;
use seatable_harness::schema::OpenApiVersion;
use seatable_harness::schema::ParameterLocation;
use seatable_harness::schema::SchemaDraft;
use seatable_harness::schema::StatusKey;
use seatable_harness::schema::load;

use crate::common::fixture_path;

const BASE_URL: &str = "https://cloud.seatable.io";

// ============================================================================
// SECTION: Valid Documents
// ============================================================================

#[test]
fn loads_yaml_document_with_shared_parameters() -> Result<(), Box<dyn Error>> {
    let handle = load(&fixture_path("rows.yaml"), BASE_URL)?;
    assert_eq!(handle.version(), OpenApiVersion::V3_0);
    let ids: Vec<&str> = handle.operation_ids().collect();
    assert_eq!(ids, vec!["appendRows", "deleteRow", "listRows"]);

    let delete = handle.get_operation("deleteRow")?;
    assert_eq!(delete.path_template, "/api/v2/dtables/{base_uuid}/rows/{row_id}/");
    assert!(delete.parameter("base_uuid", ParameterLocation::Path).is_some());
    assert!(delete.parameter("row_id", ParameterLocation::Path).is_some());
    assert_eq!(delete.response_for(401).map(|(key, _)| key), Some(StatusKey::Default));
    assert_eq!(delete.base_url.as_str(), "https://cloud.seatable.io/");
    Ok(())
}

#[test]
fn loads_openapi_3_1_document() -> Result<(), Box<dyn Error>> {
    let handle = SchemaHandle::load(&fixture_path("info_v31.yaml"), BASE_URL)?;
    assert_eq!(handle.version(), OpenApiVersion::V3_1);
    let operation = handle.get_operation("getServerInfo")?;
    assert_eq!(operation.draft, SchemaDraft::Draft202012);
    assert_eq!(operation.response_for(204).map(|(key, _)| key), Some(StatusKey::Range(2)));
    Ok(())
}

#[test]
fn nullable_fields_accept_null_after_loading() -> Result<(), Box<dyn Error>> {
    let handle = load(&fixture_path("rows.yaml"), BASE_URL)?;
    let list = handle.get_operation("listRows")?;
    let (_, response) = list.response_for(200).expect("200 declared");
    let schema = response.content[0].schema.as_ref().expect("schema");
    let name = &schema["properties"]["rows"]["items"]["properties"]["Name"];
    assert_eq!(name["type"], serde_json::json!(["string", "null"]));
    assert!(!schema.to_string().contains("$ref"));
    Ok(())
}

#[test]
fn schema_set_loads_named_documents() -> Result<(), Box<dyn Error>> {
    let dir = fixture_path("");
    let set = SchemaSet::load_dir(&dir, &["rows", "info_v31"], BASE_URL)?;
    assert_eq!(set.operation("rows", "listRows")?.id, "listRows");
    assert_eq!(set.document("info_v31")?.version(), OpenApiVersion::V3_1);
    assert_eq!(
        set.document("missing").expect_err("unknown document"),
        SchemaError::UnknownDocument("missing".to_string())
    );
    assert_eq!(
        set.operation("rows", "getServerInfo").expect_err("unknown operation"),
        SchemaError::UnknownOperation("getServerInfo".to_string())
    );
    Ok(())
}

// ============================================================================
// SECTION: Invalid Documents
// ============================================================================

#[test]
fn rejects_duplicate_operation_ids() {
    let err = load(&fixture_path("duplicate_ids.yaml"), BASE_URL).expect_err("duplicate ids");
    let SchemaError::Invalid {
        message, ..
    } = err
    else {
        panic!("expected invalid document, got {err:?}");
    };
    assert!(message.contains("duplicate operationId 'ping'"));
}

#[test]
fn rejects_unresolved_references() {
    let err = load(&fixture_path("unresolved_ref.yaml"), BASE_URL).expect_err("unresolved ref");
    assert!(matches!(err, SchemaError::Invalid { .. }), "unexpected error: {err}");
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn rejects_undeclared_path_parameters() {
    let err = load(&fixture_path("undeclared_param.yaml"), BASE_URL).expect_err("undeclared");
    assert!(err.to_string().contains("group_id"));
}

#[test]
fn reports_parse_and_io_failures() {
    let err = load(&fixture_path("malformed.yaml"), BASE_URL).expect_err("malformed");
    assert!(matches!(err, SchemaError::Parse(_)));
    let err = load(&fixture_path("absent.yaml"), BASE_URL).expect_err("absent");
    assert!(matches!(err, SchemaError::Io(_)));
}

#[test]
fn set_loading_fails_on_first_invalid_document() {
    let dir = fixture_path("");
    let err = SchemaSet::load_dir(&dir, &["rows", "duplicate_ids"], BASE_URL)
        .expect_err("invalid member");
    assert!(matches!(err, SchemaError::Invalid { .. }));
}
