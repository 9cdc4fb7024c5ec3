// system-tests/tests/helpers/snapshots.rs
// ============================================================================
// Module: Snapshot Helpers
// Description: Snapshot assertions and the masks shared across suites.
// Purpose: Keep volatile row fields out of stored snapshots.
// Dependencies: seatable-harness, system-tests
// ============================================================================

use std::error::Error;

use seatable_harness::JsonType;
use seatable_harness::Masks;
use serde_json::Value;
use system_tests::fixtures::Harness;

/// Server-generated row fields whose values change on every run.
pub const VOLATILE_ROW_FIELDS: &str = "_id|_ctime|_mtime|_creator|_last_modifier";

/// Compares `value` against the stored snapshot `<suite>/<test>`.
pub fn assert_snapshot(
    harness: &Harness,
    suite: &str,
    test: &str,
    value: &Value,
    masks: &Masks,
) -> Result<(), Box<dyn Error>> {
    harness.snapshots().snapshot(suite, test).assert_match(value, masks)?;
    Ok(())
}

/// Returns a regex matching `<list>.<index>.<field>` for each `fields`
/// alternative.
pub fn list_fields(list: &str, fields: &str) -> String {
    format!(r"{list}\..*\.({fields})")
}

/// Masks the volatile fields of every row under `list` as strings.
pub fn row_masks(list: &str, with_auto_number: bool) -> Result<Masks, Box<dyn Error>> {
    let fields = if with_auto_number {
        format!("{VOLATILE_ROW_FIELDS}|auto-number-date-prefix")
    } else {
        VOLATILE_ROW_FIELDS.to_string()
    };
    Ok(Masks::new().type_only_regex(&list_fields(list, &fields), &[JsonType::String])?)
}
