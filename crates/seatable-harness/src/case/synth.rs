// crates/seatable-harness/src/case/synth.rs
// ============================================================================
// Module: Value Synthesis
// Description: Minimal schema-conformant value generation.
// Purpose: Fill request fields the caller did not supply.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A visitor over a normalised JSON Schema that produces the smallest value
//! satisfying types, enums, required properties, and numeric and length
//! bounds. Output is deterministic but carries no business meaning; callers
//! override every field they assert on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use super::merge::merge_values;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum nesting depth before synthesis stops descending.
const MAX_DEPTH: usize = 32;

/// Upper bound on synthesized string length.
const MAX_STRING_LEN: u64 = 1024;

/// Upper bound on synthesized array length.
const MAX_ARRAY_LEN: u64 = 64;

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Produces a minimal value conforming to `schema`.
#[must_use]
pub fn synthesize(schema: &Value) -> Value {
    synthesize_at(schema, 0)
}

/// Depth-tracking worker for [`synthesize`].
fn synthesize_at(schema: &Value, depth: usize) -> Value {
    let Value::Object(map) = schema else {
        return Value::Null;
    };
    if depth >= MAX_DEPTH {
        return Value::Null;
    }
    if let Some(value) = literal(map) {
        return value;
    }
    if let Some(Value::Array(parts)) = map.get("allOf") {
        let mut merged = base_value(map, depth);
        for part in parts {
            let next = synthesize_at(part, depth + 1);
            merged = match merged {
                Value::Null => next,
                current => merge_values(current, next),
            };
        }
        return merged;
    }
    for keyword in ["oneOf", "anyOf"] {
        if let Some(Value::Array(variants)) = map.get(keyword) {
            let variant = variants.iter().find(|variant| !is_null_schema(variant));
            if let Some(variant) = variant.or_else(|| variants.first()) {
                let mut value = synthesize_at(variant, depth + 1);
                if value.is_object() && map.contains_key("properties") {
                    value = merge_values(object_value(map, depth), value);
                }
                return value;
            }
        }
    }
    base_value(map, depth)
}

/// Returns a value fixed by `const`, `enum`, `default`, or an example.
fn literal(map: &Map<String, Value>) -> Option<Value> {
    if let Some(value) = map.get("const") {
        return Some(value.clone());
    }
    if let Some(Value::Array(values)) = map.get("enum") {
        let choice = values.iter().find(|value| !value.is_null()).or_else(|| values.first());
        if let Some(choice) = choice {
            return Some(choice.clone());
        }
    }
    if let Some(value) = map.get("default") {
        return Some(value.clone());
    }
    if let Some(value) = map.get("example") {
        return Some(value.clone());
    }
    if let Some(Value::Array(values)) = map.get("examples")
        && let Some(first) = values.first()
    {
        return Some(first.clone());
    }
    None
}

/// Synthesizes a value from the schema's own type keywords.
fn base_value(map: &Map<String, Value>, depth: usize) -> Value {
    match primary_type(map) {
        Some("string") => Value::String(string_value(map)),
        Some("integer") => integer_value(map),
        Some("number") => number_value(map),
        Some("boolean") => Value::Bool(false),
        Some("array") => array_value(map, depth),
        Some("object") => object_value(map, depth),
        _ => Value::Null,
    }
}

/// Returns the first non-null declared type, inferring from keywords when
/// `type` is absent.
fn primary_type(map: &Map<String, Value>) -> Option<&str> {
    match map.get("type") {
        Some(Value::String(kind)) => Some(kind.as_str()),
        Some(Value::Array(kinds)) => {
            let mut names = kinds.iter().filter_map(Value::as_str);
            let first_non_null = names.clone().find(|kind| *kind != "null");
            first_non_null.or_else(|| names.next())
        }
        _ if map.contains_key("properties") || map.contains_key("required") => Some("object"),
        _ if map.contains_key("items") => Some("array"),
        _ => None,
    }
}

/// Returns true when the schema only admits `null`.
fn is_null_schema(schema: &Value) -> bool {
    match schema.get("type") {
        Some(Value::String(kind)) => kind == "null",
        Some(Value::Array(kinds)) => kinds.iter().all(|kind| kind.as_str() == Some("null")),
        _ => false,
    }
}

/// Synthesizes a string honouring `format` and length bounds.
fn string_value(map: &Map<String, Value>) -> String {
    let format = map.get("format").and_then(Value::as_str).unwrap_or_default();
    let formatted = match format {
        "date" => Some("2030-01-01"),
        "date-time" => Some("2030-01-01T00:00:00Z"),
        "time" => Some("00:00:00Z"),
        "email" => Some("user@example.com"),
        "uuid" => Some("00000000-0000-4000-8000-000000000000"),
        "uri" | "url" | "iri" => Some("https://example.com"),
        "hostname" => Some("example.com"),
        "ipv4" => Some("127.0.0.1"),
        "ipv6" => Some("::1"),
        _ => None,
    };
    if let Some(text) = formatted {
        return text.to_string();
    }
    let min = map.get("minLength").and_then(Value::as_u64).unwrap_or(1).min(MAX_STRING_LEN);
    let max = map.get("maxLength").and_then(Value::as_u64).unwrap_or(u64::MAX);
    let len = usize::try_from(min.max(1).min(max)).unwrap_or(1);
    "a".repeat(len)
}

/// Lower bound of a numeric schema, adjusted for exclusivity.
///
/// Handles both the draft 4 boolean form and the numeric form of
/// `exclusiveMinimum`.
fn lower_bound(map: &Map<String, Value>, step: f64) -> Option<f64> {
    let minimum = map.get("minimum").and_then(Value::as_f64);
    match map.get("exclusiveMinimum") {
        Some(Value::Bool(true)) => minimum.map(|min| min + step),
        Some(Value::Number(number)) => number.as_f64().map(|min| {
            let bumped = min + step;
            minimum.map_or(bumped, |inclusive| inclusive.max(bumped))
        }),
        _ => minimum,
    }
}

/// Upper bound of a numeric schema, adjusted for exclusivity.
fn upper_bound(map: &Map<String, Value>, step: f64) -> Option<f64> {
    let maximum = map.get("maximum").and_then(Value::as_f64);
    match map.get("exclusiveMaximum") {
        Some(Value::Bool(true)) => maximum.map(|max| max - step),
        Some(Value::Number(number)) => number.as_f64().map(|max| {
            let lowered = max - step;
            maximum.map_or(lowered, |inclusive| inclusive.min(lowered))
        }),
        _ => maximum,
    }
}

/// Picks the smallest admissible number, then rounds up to `multipleOf`.
fn numeric_candidate(map: &Map<String, Value>, step: f64) -> f64 {
    let lower = lower_bound(map, step);
    let upper = upper_bound(map, step);
    let mut value = match (lower, upper) {
        (Some(lower), _) => lower,
        (None, Some(upper)) if upper < 0.0 => upper,
        _ => 0.0,
    };
    if let Some(multiple) = map.get("multipleOf").and_then(Value::as_f64)
        && multiple > 0.0
    {
        value = (value / multiple).ceil() * multiple;
    }
    value
}

/// Synthesizes an integer value.
fn integer_value(map: &Map<String, Value>) -> Value {
    let candidate = numeric_candidate(map, 1.0).ceil();
    if candidate.is_finite() && candidate.abs() < 9.0e15 {
        #[allow(clippy::cast_possible_truncation, reason = "bounded to the exact f64 integer range")]
        let int = candidate as i64;
        Value::Number(Number::from(int))
    } else {
        Value::Number(Number::from(0))
    }
}

/// Synthesizes a number value, preferring integral spellings.
fn number_value(map: &Map<String, Value>) -> Value {
    let candidate = numeric_candidate(map, 1.0);
    if candidate.fract() == 0.0 && candidate.abs() < 9.0e15 {
        #[allow(clippy::cast_possible_truncation, reason = "integral and within exact f64 range")]
        let int = candidate as i64;
        return Value::Number(Number::from(int));
    }
    Number::from_f64(candidate).map_or(Value::Number(Number::from(0)), Value::Number)
}

/// Synthesizes an array with `minItems` entries.
fn array_value(map: &Map<String, Value>, depth: usize) -> Value {
    let count = map.get("minItems").and_then(Value::as_u64).unwrap_or(0).min(MAX_ARRAY_LEN);
    let item_schema = map.get("items").cloned().unwrap_or_else(|| Value::Object(Map::new()));
    let items = (0 .. count).map(|_| synthesize_at(&item_schema, depth + 1)).collect();
    Value::Array(items)
}

/// Synthesizes an object with every required property.
fn object_value(map: &Map<String, Value>, depth: usize) -> Value {
    let properties = map.get("properties").and_then(Value::as_object);
    let mut out = Map::new();
    if let Some(Value::Array(required)) = map.get("required") {
        for name in required.iter().filter_map(Value::as_str) {
            let value = properties
                .and_then(|props| props.get(name))
                .map_or(Value::Null, |schema| synthesize_at(schema, depth + 1));
            out.insert(name.to_string(), value);
        }
    }
    Value::Object(out)
}
