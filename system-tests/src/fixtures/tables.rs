// system-tests/src/fixtures/tables.rs
// ============================================================================
// Module: Table and Row Helpers
// Description: Table, column, row, link, and upload plumbing inside a base.
// Purpose: Prepare base contents before the operation under test runs.
// Dependencies: seatable-harness, serde, serde_json
// ============================================================================

//! ## Overview
//! Everything created here lives inside a [`Base`] and disappears with it, so
//! these helpers register no teardown steps of their own. Failures are
//! reported as [`FixtureError::Setup`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use seatable_harness::CaseOverrides;
use seatable_harness::UploadFile;
use seatable_harness::UploadRequest;
use seatable_harness::schema::ParameterLocation;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use super::FixtureError;
use super::bases::Base;
use super::context::Document;
use super::context::Harness;
use super::require_str;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Link between one row and rows of another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLinks {
    /// Table holding the link column.
    pub table_name: String,
    /// Linked table.
    pub other_table_name: String,
    /// Link id returned when the link column was inserted.
    pub link_id: String,
    /// Row in `table_name`.
    pub row_id: String,
    /// Rows in `other_table_name`.
    pub other_rows_ids: Vec<String>,
}

/// Upload link issued for a base.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadLink {
    /// Target URL for multipart uploads.
    pub upload_link: String,
    /// Parent directory of the base's asset folders.
    pub parent_path: String,
    /// Image folder relative to `parent_path`.
    pub img_relative_path: String,
    /// File folder relative to `parent_path`.
    pub file_relative_path: String,
}

impl UploadLink {
    /// Returns the asset URL a row cell uses to reference an uploaded file.
    #[must_use]
    pub fn asset_url(&self, workspace_id: i64, relative_path: &str, name: &str) -> String {
        format!("/workspace/{workspace_id}{}/{relative_path}/{name}", self.parent_path)
    }
}

/// One entry of an upload response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    /// Stored file name.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
}

// ============================================================================
// SECTION: Tables and Columns
// ============================================================================

/// Creates a table with `columns`.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails.
pub fn create_table(
    harness: &Harness,
    base: &Base<'_>,
    table_name: &str,
    columns: &Value,
) -> Result<Value, FixtureError> {
    let response = harness.invoke(
        "table",
        Document::BaseOperationsDeprecated,
        "createTableDeprecated",
        base_overrides(base).body(json!({"table_name": table_name, "columns": columns})).expect_status(200),
    )?;
    response.json().map_err(|err| FixtureError::setup("table", err.to_string()))
}

/// Inserts one column and returns the response body.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails.
pub fn insert_column(harness: &Harness, base: &Base<'_>, column: Value) -> Result<Value, FixtureError> {
    let response = harness.invoke(
        "column",
        Document::BaseOperationsDeprecated,
        "insertColumnDeprecated",
        base_overrides(base).body(column).expect_status(200),
    )?;
    response.json().map_err(|err| FixtureError::setup("column", err.to_string()))
}

/// Inserts a link column and returns its link id.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails or no link id is
/// returned.
pub fn insert_link_column(harness: &Harness, base: &Base<'_>, column: Value) -> Result<String, FixtureError> {
    let body = insert_column(harness, base, column)?;
    require_str(&body, "/data/link_id", "column")
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Adds one row and returns its id.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails or no row id is
/// returned.
pub fn add_row(harness: &Harness, base: &Base<'_>, table_name: &str, row: &Value) -> Result<String, FixtureError> {
    let response = harness.invoke(
        "row",
        Document::BaseOperationsDeprecated,
        "addRowDeprecated",
        base_overrides(base).body(json!({"table_name": table_name, "row": row})),
    )?;
    let body = response.json().map_err(|err| FixtureError::setup("row", err.to_string()))?;
    require_str(&body, "/_id", "row")
}

/// Appends rows and returns their ids in input order.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails or the number of
/// returned ids differs from the number of rows.
pub fn append_rows(
    harness: &Harness,
    base: &Base<'_>,
    table_name: &str,
    rows: &Value,
) -> Result<Vec<String>, FixtureError> {
    let response = harness.invoke(
        "rows",
        Document::BaseOperations,
        "appendRows",
        base_overrides(base).body(json!({"table_name": table_name, "rows": rows})).expect_status(200),
    )?;
    let body = response.json().map_err(|err| FixtureError::setup("rows", err.to_string()))?;
    let ids = row_ids(&body);
    let expected = rows.as_array().map_or(0, Vec::len);
    if ids.len() != expected {
        return Err(FixtureError::setup("rows", format!("expected {expected} row ids, got {}", ids.len())));
    }
    Ok(ids)
}

/// Links one row to rows of another table.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails.
pub fn create_row_links(harness: &Harness, base: &Base<'_>, links: &RowLinks) -> Result<(), FixtureError> {
    harness
        .invoke(
            "row_links",
            Document::BaseOperationsDeprecated,
            "createRowLinksDeprecated",
            base_overrides(base)
                .body(json!({
                    "table_name": links.table_name,
                    "other_table_name": links.other_table_name,
                    "link_id": links.link_id,
                    "row_id": links.row_id,
                    "other_rows_ids": links.other_rows_ids,
                }))
                .expect_status(200),
        )
        .map(|_| ())
}

/// Extracts `row_ids[*]._id`.
pub(crate) fn row_ids(body: &Value) -> Vec<String> {
    body.get("row_ids")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("_id").and_then(Value::as_str).map(str::to_string))
        .collect()
}

// ============================================================================
// SECTION: Uploads
// ============================================================================

/// Requests an upload link for the base.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails or the response is not
/// an upload link.
pub fn upload_link(harness: &Harness, base: &Base<'_>) -> Result<UploadLink, FixtureError> {
    let operation = harness.operation(Document::FileOperations, "getUploadLink")?;
    let mut overrides = CaseOverrides::new().bearer(base.token()).expect_status(200);
    if operation.parameter("base_uuid", ParameterLocation::Path).is_some() {
        overrides = overrides.path_param("base_uuid", base.uuid.as_str());
    }
    let response = harness.invoke("upload_link", Document::FileOperations, "getUploadLink", overrides)?;
    response.json_as().map_err(|err| FixtureError::setup("upload_link", err.to_string()))
}

/// Uploads a file into `relative_path` and returns the stored entry.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the file cannot be read, the upload
/// fails, or the response lists no file.
pub fn upload(
    harness: &Harness,
    link: &UploadLink,
    relative_path: &str,
    file: &Path,
    mime_type: &str,
) -> Result<UploadedFile, FixtureError> {
    let file = UploadFile::from_path(file, mime_type).map_err(|err| FixtureError::setup("upload", err.to_string()))?;
    let request = UploadRequest {
        upload_link: link.upload_link.clone(),
        parent_dir: link.parent_path.clone(),
        relative_path: relative_path.to_string(),
        file,
    };
    let response =
        harness.client().upload_file(&request).map_err(|err| FixtureError::setup("upload", err.to_string()))?;
    let entries: Vec<UploadedFile> =
        response.json_as().map_err(|err| FixtureError::setup("upload", err.to_string()))?;
    entries.into_iter().next().ok_or_else(|| FixtureError::setup("upload", "upload response lists no file"))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Overrides shared by every call scoped to a base.
fn base_overrides(base: &Base<'_>) -> CaseOverrides {
    CaseOverrides::new().path_param("base_uuid", base.uuid.as_str()).bearer(base.token())
}
