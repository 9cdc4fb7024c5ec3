// crates/seatable-harness/src/snapshot/walk.rs
// ============================================================================
// Module: Mask Application
// Description: Tree walker applying masks along dotted paths.
// Purpose: Produce the comparable form of live and stored documents.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The walker visits every node, tracking its dotted path. Exclusions are
//! evaluated first and drop the node. Type rules then replace the node with
//! the rule's marker; on the live side the node's runtime type must be one of
//! the allowed types. Stored snapshots already contain markers, so the stored
//! side is rewritten without type checks. A second pass over the live
//! document reports fields a type rule requires but the document lacks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use super::mask::JsonType;
use super::mask::Masks;
use super::mask::PathMatcher;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Which document is being masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    /// Live response; type rules are enforced.
    Live,
    /// Stored snapshot; type rules only rewrite.
    Stored,
}

/// A type rule violation on the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    /// Dotted path of the field.
    pub path: String,
    /// Allowed types.
    pub expected: Vec<JsonType>,
    /// Observed type, `None` when the field is absent.
    pub actual: Option<JsonType>,
}

impl std::fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let expected: Vec<&str> = self.expected.iter().map(|kind| kind.as_str()).collect();
        let actual = self.actual.map_or("absent", JsonType::as_str);
        write!(f, "{}: expected {}, found {actual}", self.path, expected.join(" or "))
    }
}

/// Output of masking one document.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Masked {
    /// Masked document.
    pub value: Value,
    /// Type rule violations (live side only).
    pub mismatches: Vec<TypeMismatch>,
}

// ============================================================================
// SECTION: Walker
// ============================================================================

/// Applies `masks` to `value`.
pub(super) fn apply_masks(value: &Value, masks: &Masks, side: Side) -> Masked {
    let mut state = WalkState {
        masks,
        side,
        mismatches: Vec::new(),
    };
    let masked = state.visit(value, "", None);
    if side == Side::Live {
        for rule in &masks.types {
            for path in absent_paths(value, masks, &rule.matcher) {
                state.mismatches.push(TypeMismatch {
                    path,
                    expected: rule.types.clone(),
                    actual: None,
                });
            }
        }
    }
    Masked {
        value: masked.unwrap_or(Value::Null),
        mismatches: state.mismatches,
    }
}

/// Mutable walk state.
struct WalkState<'a> {
    /// Active masks.
    masks: &'a Masks,
    /// Document side.
    side: Side,
    /// Collected type mismatches.
    mismatches: Vec<TypeMismatch>,
}

impl WalkState<'_> {
    /// Visits one node, returning `None` when it is excluded.
    fn visit(&mut self, value: &Value, path: &str, key: Option<&str>) -> Option<Value> {
        if !path.is_empty() {
            if self.masks.is_excluded(path, key) {
                return None;
            }
            if let Some(rule) = self.masks.type_rule(path) {
                if self.side == Side::Live {
                    let actual = JsonType::of(value);
                    if !rule.allows(actual) {
                        self.mismatches.push(TypeMismatch {
                            path: path.to_string(),
                            expected: rule.types.clone(),
                            actual: Some(actual),
                        });
                        return Some(value.clone());
                    }
                }
                return Some(Value::String(rule.marker()));
            }
        }
        match value {
            Value::Object(map) => {
                let mut out = Map::new();
                for (child_key, child) in map {
                    let child_path = join(path, child_key);
                    if let Some(masked) = self.visit(child, &child_path, Some(child_key)) {
                        out.insert(child_key.clone(), masked);
                    }
                }
                Some(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    let child_path = join(path, &index.to_string());
                    if let Some(masked) = self.visit(child, &child_path, None) {
                        out.push(masked);
                    }
                }
                Some(Value::Array(out))
            }
            other => Some(other.clone()),
        }
    }
}

// ============================================================================
// SECTION: Absent Fields
// ============================================================================

/// Returns the paths a type rule requires but `value` lacks.
///
/// Literal rules are resolved segment by segment; `*` fans out over every
/// child of the container it reaches, so each element must carry the field.
/// Paths at or under an exclusion, and paths below a node already replaced by
/// another type rule, are never required. A regex rule only has to match one
/// path somewhere in the document.
fn absent_paths(value: &Value, masks: &Masks, matcher: &PathMatcher) -> Vec<String> {
    let mut absent = Vec::new();
    match matcher {
        PathMatcher::Literal(literal) => {
            let segments: Vec<&str> = literal.split('.').collect();
            resolve_literal(value, masks, "", &segments, &mut absent);
        }
        PathMatcher::Pattern(regex) => {
            if !any_path_matches(value, "", &|path| regex.is_match(path)) {
                absent.push(matcher.as_str().to_string());
            }
        }
    }
    absent
}

/// Walks `segments` from `node`, recording concrete paths that are missing.
fn resolve_literal(node: &Value, masks: &Masks, path: &str, segments: &[&str], absent: &mut Vec<String>) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if *head == "*" {
        match node {
            Value::Object(map) => {
                for (key, child) in map {
                    descend(child, masks, &join(path, key), Some(key.as_str()), rest, absent);
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    descend(child, masks, &join(path, &index.to_string()), None, rest, absent);
                }
            }
            _ => record_absent(masks, path, segments, absent),
        }
        return;
    }
    let (child, key) = match node {
        Value::Object(map) => (map.get(*head), Some(*head)),
        Value::Array(items) => (head.parse::<usize>().ok().and_then(|index| items.get(index)), None),
        _ => (None, None),
    };
    match child {
        Some(child) => descend(child, masks, &join(path, head), key, rest, absent),
        None => record_absent(masks, path, segments, absent),
    }
}

/// Steps into a present child unless masking already hides it.
fn descend(
    child: &Value,
    masks: &Masks,
    path: &str,
    key: Option<&str>,
    rest: &[&str],
    absent: &mut Vec<String>,
) {
    if masks.is_excluded(path, key) {
        return;
    }
    if !rest.is_empty() && masks.type_rule(path).is_some() {
        return;
    }
    resolve_literal(child, masks, path, rest, absent);
}

/// Records `path` extended by `missing` unless an exclusion covers it.
fn record_absent(masks: &Masks, path: &str, missing: &[&str], absent: &mut Vec<String>) {
    let mut candidate = path.to_string();
    for segment in missing {
        candidate = join(&candidate, segment);
        if masks.is_excluded(&candidate, Some(*segment)) {
            return;
        }
    }
    absent.push(candidate);
}

/// Returns true when any non-root path under `node` satisfies `matches`.
fn any_path_matches(node: &Value, path: &str, matches: &dyn Fn(&str) -> bool) -> bool {
    let children: Vec<(String, &Value)> = match node {
        Value::Object(map) => map.iter().map(|(key, child)| (join(path, key), child)).collect(),
        Value::Array(items) => {
            items.iter().enumerate().map(|(index, child)| (join(path, &index.to_string()), child)).collect()
        }
        _ => return false,
    };
    children.iter().any(|(child_path, child)| matches(child_path) || any_path_matches(child, child_path, matches))
}

/// Appends a segment to a dotted path.
pub(super) fn join(path: &str, segment: &str) -> String {
    if path.is_empty() { segment.to_string() } else { format!("{path}.{segment}") }
}
