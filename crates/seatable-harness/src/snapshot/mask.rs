// crates/seatable-harness/src/snapshot/mask.rs
// ============================================================================
// Module: Snapshot Masks
// Description: Path matchers, type-only rules, and exclusion rules.
// Purpose: Neutralise volatile fields while keeping their shape checked.
// Dependencies: regex, serde_json
// ============================================================================

//! ## Overview
//! Paths are dotted (`rows.0._id`), with list indices as decimal segments.
//! A [`PathMatcher`] is either a literal path, where `*` matches exactly one
//! segment, or a regular expression that must match the whole path.
//!
//! A type rule replaces a matching value with a type marker such as
//! `"<string>"` once the value's runtime type is confirmed to be allowed. An
//! exclusion rule removes the matching value from comparison entirely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use serde_json::Value;

use super::SnapshotError;

// ============================================================================
// SECTION: JSON Types
// ============================================================================

/// Runtime type of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JsonType {
    /// `null`.
    Null,
    /// `true` or `false`.
    Boolean,
    /// Number without a fractional part.
    Integer,
    /// Number with a fractional part or exponent.
    Float,
    /// String.
    String,
    /// Array.
    Array,
    /// Object.
    Object,
}

impl JsonType {
    /// Classifies a value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(number) if number.is_i64() || number.is_u64() => Self::Integer,
            Value::Number(_) => Self::Float,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns the type name used inside markers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Path Matchers
// ============================================================================

/// Matcher over dotted paths.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Literal dotted path; `*` matches any single segment.
    Literal(String),
    /// Regular expression anchored to the whole path.
    Pattern(Regex),
}

impl PathMatcher {
    /// Builds a literal matcher.
    #[must_use]
    pub fn literal(path: impl Into<String>) -> Self {
        Self::Literal(path.into())
    }

    /// Builds a regex matcher that must match the entire path.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn pattern(pattern: &str) -> Result<Self, SnapshotError> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(Self::Pattern)
            .map_err(|err| SnapshotError::InvalidPattern(format!("{pattern}: {err}")))
    }

    /// Returns true when `path` matches.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Literal(literal) => literal_matches(literal, path),
            Self::Pattern(regex) => regex.is_match(path),
        }
    }

    /// Returns the source text of the matcher.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(literal) => literal,
            Self::Pattern(regex) => regex.as_str(),
        }
    }
}

/// Compares a literal pattern with a path segment by segment.
fn literal_matches(literal: &str, path: &str) -> bool {
    let mut expected = literal.split('.');
    let mut actual = path.split('.');
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(want), Some(got)) if want == "*" || want == got => {}
            _ => return false,
        }
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// Type-only rule.
#[derive(Debug, Clone)]
pub struct TypeRule {
    /// Paths the rule applies to.
    pub matcher: PathMatcher,
    /// Allowed runtime types (sorted, unique).
    pub types: Vec<JsonType>,
}

impl TypeRule {
    /// Marker written in place of a matching value.
    #[must_use]
    pub fn marker(&self) -> String {
        let names: Vec<&str> = self.types.iter().map(|kind| kind.as_str()).collect();
        format!("<{}>", names.join("|"))
    }

    /// Returns true when `kind` is allowed.
    #[must_use]
    pub fn allows(&self, kind: JsonType) -> bool {
        self.types.contains(&kind)
    }
}

/// Mask configuration for one comparison.
#[derive(Debug, Clone, Default)]
pub struct Masks {
    /// Type-only rules, first match wins.
    pub(super) types: Vec<TypeRule>,
    /// Exclusion rules over paths.
    pub(super) exclusions: Vec<PathMatcher>,
    /// Attribute names excluded wherever they appear.
    pub(super) excluded_keys: Vec<String>,
}

impl Masks {
    /// Creates an empty mask set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type-only rule for a literal path.
    #[must_use]
    pub fn type_only(mut self, path: &str, types: &[JsonType]) -> Self {
        self.types.push(TypeRule {
            matcher: PathMatcher::literal(path),
            types: normalize_types(types),
        });
        self
    }

    /// Adds a type-only rule for a regex over paths.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn type_only_regex(mut self, pattern: &str, types: &[JsonType]) -> Result<Self, SnapshotError> {
        self.types.push(TypeRule {
            matcher: PathMatcher::pattern(pattern)?,
            types: normalize_types(types),
        });
        Ok(self)
    }

    /// Excludes a literal path.
    #[must_use]
    pub fn exclude(mut self, path: &str) -> Self {
        self.exclusions.push(PathMatcher::literal(path));
        self
    }

    /// Excludes every path matching a regex.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn exclude_regex(mut self, pattern: &str) -> Result<Self, SnapshotError> {
        self.exclusions.push(PathMatcher::pattern(pattern)?);
        Ok(self)
    }

    /// Excludes an attribute name at any depth.
    #[must_use]
    pub fn exclude_key(mut self, name: &str) -> Self {
        self.excluded_keys.push(name.to_string());
        self
    }

    /// Returns true when the node at `path` (last key `key`) is excluded.
    pub(super) fn is_excluded(&self, path: &str, key: Option<&str>) -> bool {
        key.is_some_and(|key| self.excluded_keys.iter().any(|name| name == key))
            || self.exclusions.iter().any(|matcher| matcher.matches(path))
    }

    /// Returns the first type rule matching `path`.
    pub(super) fn type_rule(&self, path: &str) -> Option<&TypeRule> {
        self.types.iter().find(|rule| rule.matcher.matches(path))
    }
}

/// Sorts and deduplicates an allowed type list.
fn normalize_types(types: &[JsonType]) -> Vec<JsonType> {
    let mut types = types.to_vec();
    types.sort();
    types.dedup();
    types
}
