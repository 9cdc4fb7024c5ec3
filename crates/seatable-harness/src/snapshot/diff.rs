// crates/seatable-harness/src/snapshot/diff.rs
// ============================================================================
// Module: Structural Diff
// Description: Path-level differences between two JSON documents.
// Purpose: Report snapshot drift as readable, located changes.
// Dependencies: serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! Leaves are compared on their canonical JSON form, so numeric spellings
//! such as `1.0` and `1` compare equal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use super::walk::join;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum rendered length of a value in a diff line.
const MAX_RENDERED_VALUE: usize = 120;

/// Maximum number of differences rendered in one report.
pub const MAX_RENDERED_DIFFERENCES: usize = 50;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One located difference.
#[derive(Debug, Clone, PartialEq)]
pub enum Difference {
    /// Present in both with different values.
    Changed {
        /// Dotted path.
        path: String,
        /// Stored value.
        expected: Value,
        /// Live value.
        actual: Value,
    },
    /// Present only in the stored snapshot.
    Missing {
        /// Dotted path.
        path: String,
        /// Stored value.
        expected: Value,
    },
    /// Present only in the live document.
    Unexpected {
        /// Dotted path.
        path: String,
        /// Live value.
        actual: Value,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed {
                path,
                expected,
                actual,
            } => {
                let path = label(path);
                write!(f, "- {path}: {}\n+ {path}: {}", render(expected), render(actual))
            }
            Self::Missing {
                path,
                expected,
            } => write!(f, "- {}: {}", label(path), render(expected)),
            Self::Unexpected {
                path,
                actual,
            } => write!(f, "+ {}: {}", label(path), render(actual)),
        }
    }
}

/// Renders the root path visibly.
fn label(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}

/// Renders a value compactly, truncated for display.
fn render(value: &Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_RENDERED_VALUE {
        return text;
    }
    let truncated: String = text.chars().take(MAX_RENDERED_VALUE).collect();
    format!("{truncated}...")
}

// ============================================================================
// SECTION: Diff
// ============================================================================

/// Computes the differences between `expected` and `actual`.
#[must_use]
pub fn diff(expected: &Value, actual: &Value) -> Vec<Difference> {
    let mut out = Vec::new();
    diff_at(expected, actual, "", &mut out);
    out
}

/// Recursive worker for [`diff`].
fn diff_at(expected: &Value, actual: &Value, path: &str, out: &mut Vec<Difference>) {
    match (expected, actual) {
        (Value::Object(want), Value::Object(got)) => {
            let keys: BTreeSet<&String> = want.keys().chain(got.keys()).collect();
            for key in keys {
                let child = join(path, key);
                match (want.get(key), got.get(key)) {
                    (Some(want), Some(got)) => diff_at(want, got, &child, out),
                    (Some(want), None) => out.push(Difference::Missing {
                        path: child,
                        expected: want.clone(),
                    }),
                    (None, Some(got)) => out.push(Difference::Unexpected {
                        path: child,
                        actual: got.clone(),
                    }),
                    (None, None) => {}
                }
            }
        }
        (Value::Array(want), Value::Array(got)) => {
            for index in 0 .. want.len().max(got.len()) {
                let child = join(path, &index.to_string());
                match (want.get(index), got.get(index)) {
                    (Some(want), Some(got)) => diff_at(want, got, &child, out),
                    (Some(want), None) => out.push(Difference::Missing {
                        path: child,
                        expected: want.clone(),
                    }),
                    (None, Some(got)) => out.push(Difference::Unexpected {
                        path: child,
                        actual: got.clone(),
                    }),
                    (None, None) => {}
                }
            }
        }
        (want, got) => {
            if !leaves_equal(want, got) {
                out.push(Difference::Changed {
                    path: path.to_string(),
                    expected: want.clone(),
                    actual: got.clone(),
                });
            }
        }
    }
}

/// Compares two leaves on their canonical form.
fn leaves_equal(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (serde_jcs::to_vec(left), serde_jcs::to_vec(right)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Renders a difference list, truncating long reports.
#[must_use]
pub fn render_report(differences: &[Difference]) -> String {
    let mut lines: Vec<String> =
        differences.iter().take(MAX_RENDERED_DIFFERENCES).map(ToString::to_string).collect();
    if differences.len() > MAX_RENDERED_DIFFERENCES {
        lines.push(format!("... {} more", differences.len() - MAX_RENDERED_DIFFERENCES));
    }
    lines.join("\n")
}
