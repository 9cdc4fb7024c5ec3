// crates/seatable-harness/src/case/merge.rs
// ============================================================================
// Module: Override Merge
// Description: Recursive merge of caller overrides over synthesized values.
// Purpose: Let explicit request fields win at every node.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Objects merge key by key; scalars and arrays are replaced wholesale by the
//! override.

use serde_json::Value;

/// Merges `overlay` over `base`.
#[must_use]
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}
