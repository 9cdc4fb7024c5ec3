// system-tests/tests/suites/base_operations.rs
// ============================================================================
// Module: Base Operations Tests
// Description: Bases, tables, rows, links, attachments, and SQL queries.
// Purpose: Validate current and deprecated base endpoints against their
//          declared contracts and stored snapshots.
// Dependencies: system-tests helpers
// ============================================================================

use std::error::Error;

use seatable_harness::ApiResponse;
use seatable_harness::CaseOverrides;
use seatable_harness::JsonType;
use seatable_harness::Masks;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use system_tests::data;
use system_tests::fixtures::Base;
use system_tests::fixtures::Document;
use system_tests::fixtures::Harness;
use system_tests::fixtures::Workspace;
use system_tests::fixtures::tables;
use system_tests::fixtures::tables::RowLinks;

use crate::helpers::assets::LOGO_SVG;
use crate::helpers::assets::TEXT_FILE;
use crate::helpers::assets::asset_path;
use crate::helpers::harness::shared;
use crate::helpers::snapshots::VOLATILE_ROW_FIELDS;
use crate::helpers::snapshots::assert_snapshot;
use crate::helpers::snapshots::list_fields;
use crate::helpers::snapshots::row_masks;

const SUITE: &str = "base_operations";

/// Base name created by `create_base`; its workspace fixture deletes it.
const CREATE_BASE_NAME: &str = "automated-testing-ahSh2sot";

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Deprecated operations live in their own document.
fn document_for(operation_id: &str) -> Document {
    if operation_id.ends_with("Deprecated") {
        Document::BaseOperationsDeprecated
    } else {
        Document::BaseOperations
    }
}

/// Overrides for a call scoped to `base`.
fn on_base(base: &Base<'_>) -> CaseOverrides {
    CaseOverrides::new().path_param("base_uuid", base.uuid.as_str()).bearer(base.token())
}

/// Adds `convert_keys=true` for current endpoints, which otherwise return
/// column keys instead of column names.
fn with_convert_keys(operation_id: &str, overrides: CaseOverrides) -> CaseOverrides {
    if operation_id.ends_with("Deprecated") { overrides } else { overrides.query("convert_keys", true) }
}

/// Runs a validated call.
fn call(
    harness: &Harness,
    document: Document,
    operation_id: &str,
    overrides: CaseOverrides,
) -> Result<ApiResponse, Box<dyn Error>> {
    let case = harness.case(document, operation_id, overrides)?;
    Ok(harness.client().call_and_validate(&case)?)
}

/// Lists the rows of `table_name` through `operation_id`.
fn list_rows(
    harness: &Harness,
    base: &Base<'_>,
    operation_id: &str,
    table_name: &str,
) -> Result<Value, Box<dyn Error>> {
    let overrides = with_convert_keys(operation_id, on_base(base).query("table_name", table_name));
    let response = call(harness, document_for(operation_id), operation_id, overrides.expect_status(200))?;
    Ok(response.json()?)
}

/// Returns the listed row whose `text` cell equals `text`.
fn row_with_text<'v>(listing: &'v Value, text: &str) -> Result<&'v Map<String, Value>, Box<dyn Error>> {
    listing
        .get("rows")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find(|row| row.get("text").and_then(Value::as_str) == Some(text))
        .ok_or_else(|| format!("no row with text {text}").into())
}

/// Canonical form of a date cell value: `YYYY-MM-DD` with an optional time.
fn normalise_date(input: &str) -> String {
    let (date, time) = input.split_once(' ').map_or((input, None), |(date, time)| (date, Some(time)));
    let parts: Vec<&str> = date.split(['/', '.']).collect();
    let iso = match parts.as_slice() {
        [year, month, day] if year.len() == 4 => format!("{year}-{month}-{day}"),
        [day, month, year] if year.len() == 4 => format!("{year}-{month}-{day}"),
        _ => date.to_string(),
    };
    match time {
        Some(time) => format!("{iso} {time}"),
        None => iso,
    }
}

/// Compares a supplied cell with its read-back value.
fn cell_matches(column: &str, supplied: &Value, stored: &Value) -> bool {
    match (supplied, stored) {
        (Value::String(input), Value::String(output)) if column.starts_with("date-") => {
            normalise_date(input) == *output
        }
        (Value::Number(input), Value::Number(output)) => input.as_f64() == output.as_f64(),
        _ => supplied == stored,
    }
}

/// Creates the full-catalog table and appends the row catalog.
fn seeded_table(harness: &Harness, base: &Base<'_>, table_name: &str) -> Result<Vec<String>, Box<dyn Error>> {
    tables::create_table(harness, base, table_name, &data::columns())?;
    Ok(tables::append_rows(harness, base, table_name, &data::rows())?)
}

// ============================================================================
// SECTION: Bases and Tables
// ============================================================================

#[test]
fn create_base() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let workspace = Workspace::create(harness, CREATE_BASE_NAME)?;
    let token = harness.account_token()?;
    let overrides = CaseOverrides::new()
        .body(json!({"workspace_id": workspace.workspace_id(), "name": CREATE_BASE_NAME}))
        .bearer(&token)
        .expect_status(201);
    let response = call(harness, Document::UserAccountOperations, "createBase", overrides)?;

    let masks = Masks::new()
        .type_only("table.created_at", &[JsonType::String])
        .type_only("table.id", &[JsonType::Integer])
        .type_only("table.updated_at", &[JsonType::String])
        .type_only("table.uuid", &[JsonType::String])
        .type_only("table.workspace_id", &[JsonType::Integer]);
    assert_snapshot(harness, SUITE, "create_base", &response.json()?, &masks)?;
    workspace.release()?;
    Ok(())
}

fn create_table(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = format!("test_{operation_id}");
    let overrides = on_base(&base)
        .body(json!({"table_name": table_name, "columns": data::columns()}))
        .expect_status(200);
    let response = call(harness, document_for(operation_id), operation_id, overrides)?;

    let masks =
        Masks::new().type_only("_id", &[JsonType::String]).type_only("columns", &[JsonType::Array]);
    let test = format!("create_table[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &response.json()?, &masks)?;
    base.release()?;
    Ok(())
}

#[test]
fn create_table_current() -> Result<(), Box<dyn Error>> {
    create_table("createTable")
}

#[test]
fn create_table_deprecated() -> Result<(), Box<dyn Error>> {
    create_table("createTableDeprecated")
}

// ============================================================================
// SECTION: Rows
// ============================================================================

fn append_rows(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = format!("test_{operation_id}");
    tables::create_table(harness, &base, &table_name, &data::columns())?;

    let overrides =
        on_base(&base).body(json!({"table_name": table_name, "rows": data::rows()})).expect_status(200);
    let response = call(harness, document_for(operation_id), operation_id, overrides)?;

    let masks = Masks::new()
        .type_only("first_row", &[JsonType::Object])
        .type_only_regex(r"row_ids\..*\._id", &[JsonType::String])?;
    let test = format!("append_rows[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &response.json()?, &masks)?;
    base.release()?;
    Ok(())
}

#[test]
fn append_rows_current() -> Result<(), Box<dyn Error>> {
    append_rows("appendRows")
}

#[test]
fn append_rows_deprecated() -> Result<(), Box<dyn Error>> {
    append_rows("appendRowsDeprecated")
}

fn get_row(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = format!("test_{operation_id}");
    tables::create_table(harness, &base, &table_name, &data::columns())?;
    let row_id = tables::add_row(harness, &base, &table_name, &data::single_row())?;

    let overrides = on_base(&base).path_param("row_id", row_id).query("table_name", table_name.as_str());
    let overrides = with_convert_keys(operation_id, overrides).expect_status(200);
    let response = call(harness, document_for(operation_id), operation_id, overrides)?;

    let masks = data::GENERATED_ROW_FIELDS
        .iter()
        .fold(Masks::new(), |masks, field| masks.type_only(field, &[JsonType::String]));
    let test = format!("get_row[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &response.json()?, &masks)?;
    base.release()?;
    Ok(())
}

#[test]
fn get_row_current() -> Result<(), Box<dyn Error>> {
    get_row("getRow")
}

#[test]
fn get_row_deprecated() -> Result<(), Box<dyn Error>> {
    get_row("getRowDeprecated")
}

fn list_rows_catalog(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = format!("test_{operation_id}");
    seeded_table(harness, &base, &table_name)?;

    let listing = list_rows(harness, &base, operation_id, &table_name)?;
    let test = format!("list_rows[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &listing, &row_masks("rows", true)?)?;
    base.release()?;
    Ok(())
}

#[test]
fn list_rows_current() -> Result<(), Box<dyn Error>> {
    list_rows_catalog("listRows")
}

#[test]
fn list_rows_deprecated() -> Result<(), Box<dyn Error>> {
    list_rows_catalog("listRowsDeprecated")
}

// ============================================================================
// SECTION: Links
// ============================================================================

fn list_rows_links(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let source = format!("test_{operation_id}_links-1");
    let target = format!("test_{operation_id}_links-2");
    tables::create_table(harness, &base, &source, &data::number_columns())?;
    tables::create_table(harness, &base, &target, &data::number_columns())?;

    let source_ids = tables::append_rows(harness, &base, &source, &data::link_source_rows())?;
    let target_id = tables::add_row(harness, &base, &target, &json!({"number": 2.1}))?;
    let link_id = tables::insert_link_column(harness, &base, data::link_column(&target, &source))?;
    tables::create_row_links(
        harness,
        &base,
        &RowLinks {
            table_name: target.clone(),
            other_table_name: source,
            link_id,
            row_id: target_id,
            other_rows_ids: source_ids,
        },
    )?;
    for column in data::link_formula_columns(&target) {
        tables::insert_column(harness, &base, column)?;
    }

    let listing = list_rows(harness, &base, operation_id, &target)?;
    let masks = row_masks("rows", false)?.type_only_regex(r"rows\..*\.link\.\d+", &[JsonType::String])?;
    let test = format!("list_rows_links[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &listing, &masks)?;
    base.release()?;
    Ok(())
}

#[test]
fn list_rows_links_current() -> Result<(), Box<dyn Error>> {
    list_rows_links("listRows")
}

#[test]
fn list_rows_links_deprecated() -> Result<(), Box<dyn Error>> {
    list_rows_links("listRowsDeprecated")
}

// ============================================================================
// SECTION: Attachments
// ============================================================================

fn list_rows_files_images(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = format!("test_{operation_id}_files_images");
    tables::create_table(harness, &base, &table_name, &data::attachment_columns())?;

    let link = tables::upload_link(harness, &base)?;
    let image = tables::upload(harness, &link, &link.img_relative_path, &asset_path(LOGO_SVG), "image/svg+xml")?;
    let file = tables::upload(harness, &link, &link.file_relative_path, &asset_path(TEXT_FILE), "text/plain")?;
    let workspace_id = base.workspace_id();
    let row = json!({
        "images": [link.asset_url(workspace_id, &link.img_relative_path, &image.name)],
        "files": [{
            "name": file.name,
            "size": file.size,
            "type": "file",
            "url": link.asset_url(workspace_id, &link.file_relative_path, &file.name),
        }],
    });
    tables::add_row(harness, &base, &table_name, &row)?;

    let listing = list_rows(harness, &base, operation_id, &table_name)?;
    let masks = row_masks("rows", false)?
        .type_only_regex(r"rows\..*\.files\.0\.url", &[JsonType::String])?
        .type_only_regex(r"rows\..*\.images\.0", &[JsonType::String])?;
    let test = format!("list_rows_files_images[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &listing, &masks)?;
    base.release()?;
    Ok(())
}

#[test]
fn list_rows_files_images_current() -> Result<(), Box<dyn Error>> {
    list_rows_files_images("listRows")
}

#[test]
fn list_rows_files_images_deprecated() -> Result<(), Box<dyn Error>> {
    list_rows_files_images("listRowsDeprecated")
}

// ============================================================================
// SECTION: SQL
// ============================================================================

fn query_sql(operation_id: &str) -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = format!("test_{operation_id}");
    seeded_table(harness, &base, &table_name)?;

    let overrides = on_base(&base)
        .body(json!({"sql": format!("SELECT * FROM {table_name}"), "convert_keys": true}))
        .expect_status(200);
    let response = call(harness, document_for(operation_id), operation_id, overrides)?;

    let volatile = format!("{VOLATILE_ROW_FIELDS}|auto-number-date-prefix");
    let masks = Masks::new()
        .type_only("metadata", &[JsonType::Array])
        .type_only_regex(&list_fields("results", &volatile), &[JsonType::String])?;
    let test = format!("query_sql[{operation_id}]");
    assert_snapshot(harness, SUITE, &test, &response.json()?, &masks)?;
    base.release()?;
    Ok(())
}

#[test]
fn query_sql_current() -> Result<(), Box<dyn Error>> {
    query_sql("querySQL")
}

#[test]
fn query_sql_deprecated() -> Result<(), Box<dyn Error>> {
    query_sql("querySQLDeprecated")
}

// ============================================================================
// SECTION: Cell Semantics
// ============================================================================

#[test]
fn iso_date_and_formula_cells_read_back_normalised() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = "test_cell_semantics";
    seeded_table(harness, &base, table_name)?;

    let listing = list_rows(harness, &base, "listRows", table_name)?;
    let row = row_with_text(&listing, "ABC")?;
    let date = row.get(data::DATE_ISO_COLUMN).map_or_else(String::new, Value::to_string);
    if date != "\"2030-06-20\"" {
        return Err(format!("date-iso read back as {date}").into());
    }
    if row.get(data::FORMULA_INTEGER_COLUMN).and_then(Value::as_f64) != Some(3.0) {
        return Err("integer formula did not evaluate to 3".into());
    }
    if row.get(data::FORMULA_BOOLEAN_COLUMN) != Some(&Value::Bool(false)) {
        return Err("boolean formula did not evaluate to false".into());
    }
    base.release()?;
    Ok(())
}

#[test]
fn sparse_row_reads_back_without_unsupplied_columns() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = "test_sparse_row";
    // Computed columns (formulas, auto numbers) would legitimately fill every row.
    let columns: Vec<Value> = data::columns()
        .as_array()
        .into_iter()
        .flatten()
        .filter(|column| {
            !matches!(column.get("column_type").and_then(Value::as_str), Some("formula" | "auto-number"))
        })
        .cloned()
        .collect();
    tables::create_table(harness, &base, table_name, &Value::Array(columns))?;
    let row_id = tables::add_row(harness, &base, table_name, &json!({"text": "sparse"}))?;

    let overrides = on_base(&base)
        .path_param("row_id", row_id)
        .query("table_name", table_name)
        .query("convert_keys", true)
        .expect_status(200);
    let row = call(harness, Document::BaseOperations, "getRow", overrides)?.json()?;
    let unexpected: Vec<String> = row
        .as_object()
        .into_iter()
        .flat_map(Map::keys)
        .filter(|key| key.as_str() != "text" && !key.starts_with('_'))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(format!("unsupplied columns present: {}", unexpected.join(", ")).into());
    }
    if row.get("text") != Some(&json!("sparse")) {
        return Err("text cell did not round-trip".into());
    }
    base.release()?;
    Ok(())
}

#[test]
fn supplied_cells_round_trip_through_list_rows() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let base = Base::create(harness)?;
    let table_name = "test_round_trip";
    seeded_table(harness, &base, table_name)?;
    let listing = list_rows(harness, &base, "listRows", table_name)?;

    let supplied_rows = data::rows();
    // The first catalog row carries currency, percent, and US-format cells the
    // server reformats; it is covered by the list_rows snapshots instead.
    for supplied in supplied_rows.as_array().into_iter().flatten().filter_map(Value::as_object).skip(1) {
        let text = supplied.get("text").and_then(Value::as_str).unwrap_or_default();
        let stored = row_with_text(&listing, text)?;
        for (column, value) in supplied {
            let Some(read_back) = stored.get(column) else {
                return Err(format!("row {text}: column {column} missing on read-back").into());
            };
            if !cell_matches(column, value, read_back) {
                return Err(format!("row {text}: column {column} changed on read-back").into());
            }
        }
    }
    base.release()?;
    Ok(())
}
