// system-tests/src/data.rs
// ============================================================================
// Module: Column and Row Catalogs
// Description: Table definitions and row payloads used by the base suites.
// Purpose: Cover every column type with one shared, stable data set.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`columns`] declares one column per supported type and format. [`rows`]
//! fills them with values that exercise date parsing, number formats, select
//! options, and a sparse row carrying only `text`.
//! The `DD/MM/YYYY HH:mm` date format is rejected by the server's column
//! validation and is therefore absent from [`columns`]; rows still send a
//! value for it, which the server drops.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Date column whose format normalizes slashes to dashes.
pub const DATE_ISO_COLUMN: &str = "date-iso";

/// Formula column evaluating `1 + 2`.
pub const FORMULA_INTEGER_COLUMN: &str = "formula-integer-return-value";

/// Formula column evaluating `and(true(), false())`.
pub const FORMULA_BOOLEAN_COLUMN: &str = "formula-boolean-return-value";

/// Columns whose values the server generates per row.
pub const GENERATED_ROW_FIELDS: [&str; 6] =
    ["_id", "_ctime", "_mtime", "_creator", "_last_modifier", "auto-number-date-prefix"];

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Returns the full column catalog.
#[must_use]
pub fn columns() -> Value {
    json!([
        {"column_name": "text", "column_type": "text"},
        {"column_name": "long-text", "column_type": "long-text"},
        {"column_name": "number", "column_type": "number"},
        {
            "column_name": "number-decimal-dot-thousands-comma",
            "column_type": "number",
            "column_data": {"format": "number", "decimal": "dot", "thousands": "comma"}
        },
        {
            "column_name": "number-percent",
            "column_type": "number",
            "column_data": {"format": "percent", "decimal": "comma", "thousands": "no"}
        },
        {
            "column_name": "number-euro",
            "column_type": "number",
            "column_data": {"format": "euro", "decimal": "comma", "thousands": "no"}
        },
        {"column_name": "collaborator", "column_type": "collaborator"},
        date_column(DATE_ISO_COLUMN, "YYYY-MM-DD"),
        date_column("date-iso-hours-minutes", "YYYY-MM-DD HH:mm"),
        date_column("date-us", "M/D/YYYY"),
        date_column("date-us-hours-minutes", "M/D/YYYY HH:mm"),
        date_column("date-european", "DD/MM/YYYY"),
        date_column("date-german", "DD.MM.YYYY"),
        date_column("date-german-hours-minutes", "DD.MM.YYYY HH:mm"),
        {
            "column_name": "duration-hours-minutes",
            "column_type": "duration",
            "column_data": {"format": "duration", "duration_format": "h:mm"}
        },
        {
            "column_name": "duration-hours-minutes-seconds",
            "column_type": "duration",
            "column_data": {"format": "duration", "duration_format": "h:mm:ss"}
        },
        {
            "column_name": "single-select",
            "column_type": "single-select",
            "column_data": {"options": [
                select_option("0000", "option-1", "#9860E5"),
                select_option("ef3s", "option-2", "#89D2EA"),
                select_option("38d7", "option-3", "#59CB74"),
            ]}
        },
        {
            "column_name": "multiple-select",
            "column_type": "multiple-select",
            "column_data": {"options": [
                select_option("0000", "option-1", "#9860E5"),
                select_option("ef32", "option-2", "#89D2EA"),
                select_option("yze2", "option-3", "#59CB74"),
            ]}
        },
        {"column_name": "email", "column_type": "email"},
        {"column_name": "url", "column_type": "url"},
        {"column_name": "checkbox", "column_type": "checkbox"},
        {"column_name": "rate", "column_type": "rate", "column_data": {"rate_max_number": 10}},
        formula_column("formula", "dateAdd({date-iso}, 1, 'year')"),
        formula_column(FORMULA_INTEGER_COLUMN, "1 + 2"),
        formula_column("formula-float-return-value", "1.3 + 2.6"),
        formula_column(FORMULA_BOOLEAN_COLUMN, "and(true(), false())"),
        {
            "column_name": "geolocation-country-region",
            "column_type": "geolocation",
            "column_data": {"geo_format": "country_region", "lang": "en"}
        },
        {
            "column_name": "geolocation-lat-lon",
            "column_type": "geolocation",
            "column_data": {"geo_format": "lng_lat"}
        },
        {
            "column_name": "auto-number-integer",
            "column_type": "auto-number",
            "column_data": {"format": "0000", "digits": 4}
        },
        {
            "column_name": "auto-number-string-prefix",
            "column_type": "auto-number",
            "column_data": {"format": "0000", "digits": 4, "prefix_type": "string", "prefix": "row"}
        },
        {
            "column_name": "auto-number-date-prefix",
            "column_type": "auto-number",
            "column_data": {"format": "0000", "digits": 4, "prefix_type": "date"}
        },
        {"column_name": "digital-sign", "column_type": "digital-sign"},
    ])
}

/// Returns a single-column `number` table definition.
#[must_use]
pub fn number_columns() -> Value {
    json!([{"column_name": "number", "column_type": "number"}])
}

/// Returns the text/image/file table definition.
#[must_use]
pub fn attachment_columns() -> Value {
    json!([
        {"column_name": "text", "column_type": "text"},
        {"column_name": "images", "column_type": "image"},
        {"column_name": "files", "column_type": "file"},
    ])
}

/// Returns the `link` column joining `table` to `other_table`.
#[must_use]
pub fn link_column(table: &str, other_table: &str) -> Value {
    json!({
        "table_name": table,
        "column_name": "link",
        "column_type": "link",
        "column_data": {"table": table, "other_table": other_table},
    })
}

/// Returns the link-formula columns computed over the `link` column of `table`.
#[must_use]
pub fn link_formula_columns(table: &str) -> Vec<Value> {
    let rollup = |name: &str, method: &str| {
        json!({
            "table_name": table,
            "column_name": name,
            "column_type": "link-formula",
            "column_data": {
                "formula": "rollup",
                "link_column": "link",
                "summary_column": "number",
                "summary_method": method,
            },
        })
    };
    let find = |name: &str, formula: &str| {
        json!({
            "table_name": table,
            "column_name": name,
            "column_type": "link-formula",
            "column_data": {
                "formula": formula,
                "link_column": "link",
                "searched_column": "number",
                "comparison_column": "number",
            },
        })
    };
    vec![
        json!({
            "table_name": table,
            "column_name": "link-formula-lookup",
            "column_type": "link-formula",
            "column_data": {"formula": "lookup", "link_column": "link", "level1_linked_column": "number"},
        }),
        json!({
            "table_name": table,
            "column_name": "link-formula-countlinks",
            "column_type": "link-formula",
            "column_data": {"formula": "count_links", "link_column": "link"},
        }),
        rollup("link-formula-rollup-average", "average"),
        rollup("link-formula-rollup-max", "max"),
        rollup("link-formula-rollup-concatenate", "concatenate"),
        find("link-formula-findmax", "findmax"),
        find("link-formula-findmin", "findmin"),
    ]
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// Returns the row catalog, ending with a row that only sets `text`.
#[must_use]
pub fn rows() -> Value {
    json!([
        {
            "text": "ABC",
            "long-text": "## Heading\n- Item 1\n- Item 2",
            "number": 499.99,
            "number-decimal-dot-thousands-comma": 1_000_000.123,
            "number-percent": 5,
            "number-euro": 5.23,
            "date-iso": "2030/06/20",
            "date-iso-hours-minutes": "2030/06/20 23:55",
            "date-us": "6/5/2024",
            "date-us-hours-minutes": "6/5/2024 23:55",
            "date-european": "05/06/2024",
            "date-european-hours-minutes": "05/06/2024 23:55",
            "date-german": "20.06.2030",
            "date-german-hours-minutes": "20.06.2030 23:55",
            "duration-hours-minutes": "5400",
            "duration-hours-minutes-seconds": "5430",
            "single-select": "option-1",
            "multiple-select": ["option-1", "option-2"],
            "email": "example@seatable.io",
            "url": "https://seatable.io",
            "checkbox": true,
            "rate": 7,
            "geolocation-country-region": {"country_region": "Germany"},
            "geolocation-lat-lon": {"lng": 8.23, "lat": 50.00},
            "digital-sign": {
                "username": "some-user@auth.local",
                "sign_image_url": "https://admin.seatable.io/assets/SeaTable256-256.png",
                "sign_time": "2024-06-05T13:28:56.090+00:00",
            },
        },
        {
            "text": "D",
            "long-text": "## Heading\n- Item 1\n- Item 2",
            "number": 500,
            "number-percent": 5.123_45,
            "number-euro": 10.2345,
            "date-iso": "2030/06/20",
            "date-iso-hours-minutes": "2030/06/20 23:55",
            "date-german": "20.06.2030",
            "date-german-hours-minutes": "20.06.2030 23:55",
            "single-select": "option-2",
            "multiple-select": ["option-2", "option-3"],
            "checkbox": false,
        },
        {
            "text": "E",
            "long-text": "## Heading\n- Item 1\n- Item 2",
            "number": -10,
            "date-iso": "2030/06/20",
            "date-iso-hours-minutes": "2030/06/20 23:55",
            "date-german": "20.06.2030",
            "date-german-hours-minutes": "20.06.2030 23:55",
            "single-select": "option-3",
            "multiple-select": ["option-1", "option-2", "option-3"],
            "checkbox": true,
        },
        {"text": "row-with-empty-values"},
    ])
}

/// Returns the single row inserted by the get-row tests.
#[must_use]
pub fn single_row() -> Value {
    json!({
        "text": "ABC",
        "long-text": "## Heading\n- Item 1\n- Item 2",
        "number": 499.99,
        "date-iso": "2030/06/20",
        "date-iso-hours-minutes": "2030/06/20 23:55",
        "date-german": "20.06.2030",
        "date-german-hours-minutes": "20.06.2030 23:55",
        "checkbox": true,
        "single-select": "option-1",
        "multiple-select": ["option-1", "option-2"],
        "rate": 2,
        "url": "https://cloud.seatable.io",
        "email": "demo@example.com",
    })
}

/// Returns the number values appended to the first link table.
#[must_use]
pub fn link_source_rows() -> Value {
    json!([
        {"number": 1.1},
        {"number": 1.1},
        {"number": 1.2},
        {"number": 1.3},
        {"number": 1.4},
        {"number": 1.4},
    ])
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a `date` column definition.
fn date_column(name: &str, format: &str) -> Value {
    json!({"column_name": name, "column_type": "date", "column_data": {"format": format}})
}

/// Builds a `formula` column definition.
fn formula_column(name: &str, formula: &str) -> Value {
    json!({"column_name": name, "column_type": "formula", "column_data": {"formula": formula}})
}

/// Builds one select option.
fn select_option(id: &str, name: &str, color: &str) -> Value {
    json!({"id": id, "name": name, "color": color, "textColor": "#000000"})
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::columns;
    use super::link_formula_columns;
    use super::rows;

    #[test]
    fn column_names_are_unique() {
        let catalog = columns();
        let names: Vec<&str> = catalog
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|column| column["column_name"].as_str())
            .collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert!(!unique.contains("date-european-hours-minutes"));
    }

    #[test]
    fn last_row_only_sets_text() {
        let catalog = rows();
        let last = catalog.as_array().and_then(|rows| rows.last()).and_then(|row| row.as_object());
        assert_eq!(last.map(|row| row.len()), Some(1));
    }

    #[test]
    fn link_formulas_target_the_given_table() {
        let columns = link_formula_columns("t2");
        assert_eq!(columns.len(), 7);
        assert!(columns.iter().all(|column| column["table_name"] == "t2"));
    }
}
