// crates/seatable-harness/src/schema/resolve.rs
// ============================================================================
// Module: Schema Normalisation
// Description: Local `$ref` resolution and OpenAPI dialect rewriting.
// Purpose: Produce self-contained JSON Schemas for each operation.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Operation schemas are made self-contained by inlining every local `$ref`.
//! A reference that re-enters itself collapses to the unconstrained schema
//! `{}`. For OpenAPI 3.0 documents, `nullable: true` is rewritten into a type
//! that admits `null`, since draft 4 validators do not understand `nullable`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use super::document::OpenApiVersion;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keywords whose values are instance data, not subschemas.
const DATA_KEYWORDS: [&str; 5] = ["enum", "const", "default", "example", "examples"];

/// Keywords whose values map arbitrary names to subschemas.
const SCHEMA_MAP_KEYWORDS: [&str; 4] = ["properties", "patternProperties", "$defs", "definitions"];

/// Maximum inlining depth before a branch collapses to `{}`.
const MAX_INLINE_DEPTH: usize = 64;

// ============================================================================
// SECTION: References
// ============================================================================

/// Resolves a local `$ref` string against the document root.
///
/// # Errors
///
/// Returns an error when the reference is not local or does not resolve.
pub(super) fn lookup_ref<'a>(root: &'a Value, reference: &str) -> Result<&'a Value, String> {
    let Some(pointer) = reference.strip_prefix('#') else {
        return Err(format!("non-local $ref '{reference}'"));
    };
    root.pointer(pointer).ok_or_else(|| format!("unresolved $ref '{reference}'"))
}

/// Follows `$ref` chains on a node, returning the node itself when it is not
/// a reference or the chain cannot be followed.
pub(super) fn deref<'a>(root: &'a Value, node: &'a Value) -> &'a Value {
    let mut current = node;
    for _ in 0 .. MAX_INLINE_DEPTH {
        match current.get("$ref").and_then(Value::as_str) {
            Some(reference) => match lookup_ref(root, reference) {
                Ok(target) => current = target,
                Err(_) => return current,
            },
            None => return current,
        }
    }
    current
}

/// Returns a copy of `schema` with every local reference inlined.
pub(super) fn inline_refs(root: &Value, schema: &Value) -> Value {
    let mut stack = Vec::new();
    inline_node(root, schema, &mut stack)
}

/// Recursive worker for [`inline_refs`].
fn inline_node<'a>(root: &'a Value, node: &'a Value, stack: &mut Vec<&'a str>) -> Value {
    if stack.len() >= MAX_INLINE_DEPTH {
        return Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                if stack.contains(&reference) {
                    return Value::Object(Map::new());
                }
                let Ok(target) = lookup_ref(root, reference) else {
                    return Value::Object(Map::new());
                };
                stack.push(reference);
                let resolved = inline_node(root, target, stack);
                stack.pop();
                return resolved;
            }
            let mut out = Map::new();
            for (key, child) in map {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    out.insert(key.clone(), child.clone());
                } else if SCHEMA_MAP_KEYWORDS.contains(&key.as_str())
                    && let Value::Object(entries) = child
                {
                    let mut named = Map::new();
                    for (name, entry) in entries {
                        named.insert(name.clone(), inline_node(root, entry, stack));
                    }
                    out.insert(key.clone(), Value::Object(named));
                } else {
                    out.insert(key.clone(), inline_node(root, child, stack));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| inline_node(root, item, stack)).collect())
        }
        other => other.clone(),
    }
}

// ============================================================================
// SECTION: Dialect
// ============================================================================

/// Rewrites OpenAPI-specific keywords into plain JSON Schema.
pub(super) fn normalize(schema: Value, version: OpenApiVersion) -> Value {
    match version {
        OpenApiVersion::V3_0 => rewrite_nullable(schema),
        OpenApiVersion::V3_1 => schema,
    }
}

/// Replaces `nullable: true` with a `null`-admitting schema, recursively.
fn rewrite_nullable(schema: Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            let mut nullable = false;
            for (key, child) in map {
                if key == "nullable" {
                    nullable = child.as_bool().unwrap_or(false);
                } else if DATA_KEYWORDS.contains(&key.as_str()) {
                    out.insert(key, child);
                } else if SCHEMA_MAP_KEYWORDS.contains(&key.as_str())
                    && let Value::Object(entries) = child
                {
                    let named = entries
                        .into_iter()
                        .map(|(name, entry)| (name, rewrite_nullable(entry)))
                        .collect();
                    out.insert(key, Value::Object(named));
                } else {
                    out.insert(key, rewrite_nullable(child));
                }
            }
            if nullable { admit_null(out) } else { Value::Object(out) }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(rewrite_nullable).collect()),
        other => other,
    }
}

/// Widens an object schema so `null` is accepted.
fn admit_null(mut schema: Map<String, Value>) -> Value {
    if let Some(Value::Array(values)) = schema.get_mut("enum")
        && !values.contains(&Value::Null)
    {
        values.push(Value::Null);
    }
    match schema.remove("type") {
        Some(Value::String(kind)) => {
            schema.insert(
                "type".to_string(),
                Value::Array(vec![Value::String(kind), Value::String("null".to_string())]),
            );
            Value::Object(schema)
        }
        Some(Value::Array(mut kinds)) => {
            let null = Value::String("null".to_string());
            if !kinds.contains(&null) {
                kinds.push(null);
            }
            schema.insert("type".to_string(), Value::Array(kinds));
            Value::Object(schema)
        }
        Some(other) => {
            schema.insert("type".to_string(), other);
            Value::Object(schema)
        }
        None => {
            let mut null_schema = Map::new();
            null_schema.insert("type".to_string(), Value::String("null".to_string()));
            let mut wrapper = Map::new();
            wrapper.insert(
                "anyOf".to_string(),
                Value::Array(vec![Value::Object(schema), Value::Object(null_schema)]),
            );
            Value::Object(wrapper)
        }
    }
}
