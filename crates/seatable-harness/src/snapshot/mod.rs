// crates/seatable-harness/src/snapshot/mod.rs
// ============================================================================
// Module: Snapshot Comparator
// Description: Masked comparison of JSON bodies against stored snapshots.
// Purpose: Guard response shapes against regressions.
// Dependencies: regex, serde_jcs, serde_json
// ============================================================================

//! ## Overview
//! A snapshot is one canonical JSON document per test identity
//! (`<suite>/<test>`), stored as pretty-printed JSON with sorted keys. The
//! first comparison for an identity writes the snapshot and passes; later
//! comparisons mask both sides, decide equality on `serde_jcs` canonical
//! bytes, and report a structural diff on drift. In update mode, stored
//! snapshots are overwritten instead of compared.
//!
//! Masks never let a masked or excluded value cause drift, but a type-masked
//! field that is absent or of a disallowed type fails the comparison.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod diff;
mod mask;
mod walk;


pub use diff::Difference;
pub use diff::diff;
pub use mask::JsonType;
pub use mask::Masks;
pub use mask::PathMatcher;
pub use walk::TypeMismatch;

use walk::Side;
use walk::apply_masks;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Snapshot comparison errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    /// I/O failure reading or writing a snapshot.
    #[error("snapshot io error: {0}")]
    Io(String),
    /// A stored snapshot is not valid JSON.
    #[error("stored snapshot {path} is invalid: {message}")]
    Parse {
        /// Snapshot path.
        path: String,
        /// Parse failure.
        message: String,
    },
    /// A mask pattern failed to compile.
    #[error("invalid mask pattern: {0}")]
    InvalidPattern(String),
    /// Canonicalization failed.
    #[error("snapshot canonicalization failed: {0}")]
    Canonical(String),
    /// A type-masked field is absent or has a disallowed type.
    #[error("snapshot {identity} type mismatch:\n{}", render_mismatches(.mismatches))]
    TypeMismatch {
        /// Test identity.
        identity: String,
        /// Reported mismatches.
        mismatches: Vec<TypeMismatch>,
    },
    /// The live document differs from the stored snapshot.
    #[error("snapshot {identity} drifted:\n{}", diff::render_report(.differences))]
    Drift {
        /// Test identity.
        identity: String,
        /// Located differences.
        differences: Vec<Difference>,
    },
}

/// Renders type mismatches one per line.
fn render_mismatches(mismatches: &[TypeMismatch]) -> String {
    mismatches.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of a successful comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// No snapshot existed; it was written.
    Created,
    /// The live document matched the stored snapshot.
    Matched,
    /// Update mode replaced a differing snapshot.
    Updated,
}

/// Snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    /// Root directory holding `<suite>/<test>.json` files.
    root: PathBuf,
    /// Overwrite stored snapshots instead of comparing.
    update: bool,
}

impl SnapshotStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, update: bool) -> Self {
        Self {
            root: root.into(),
            update,
        }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true in update mode.
    #[must_use]
    pub const fn update_mode(&self) -> bool {
        self.update
    }

    /// Opens the snapshot handle for one test.
    #[must_use]
    pub fn snapshot(&self, suite: &str, test: &str) -> Snapshot {
        Snapshot {
            store: self.clone(),
            identity: format!("{}/{}", sanitize(suite), sanitize(test)),
            assertions: 0,
        }
    }

    /// Compares `value` against the snapshot stored under `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] on type mismatch, drift, or I/O failure.
    pub fn compare(
        &self,
        identity: &str,
        value: &Value,
        masks: &Masks,
    ) -> Result<SnapshotOutcome, SnapshotError> {
        let live = apply_masks(value, masks, Side::Live);
        if !live.mismatches.is_empty() {
            return Err(SnapshotError::TypeMismatch {
                identity: identity.to_string(),
                mismatches: live.mismatches,
            });
        }
        let path = self.path_for(identity);
        let Some(stored) = read_snapshot(&path)? else {
            write_snapshot(&path, &live.value)?;
            return Ok(SnapshotOutcome::Created);
        };
        let stored = apply_masks(&stored, masks, Side::Stored).value;
        if canonical(&stored)? == canonical(&live.value)? {
            return Ok(SnapshotOutcome::Matched);
        }
        if self.update {
            write_snapshot(&path, &live.value)?;
            return Ok(SnapshotOutcome::Updated);
        }
        let differences = diff::diff(&stored, &live.value);
        if differences.is_empty() {
            return Ok(SnapshotOutcome::Matched);
        }
        Err(SnapshotError::Drift {
            identity: identity.to_string(),
            differences,
        })
    }

    /// Returns the file path for an identity.
    #[must_use]
    pub fn path_for(&self, identity: &str) -> PathBuf {
        let mut path = self.root.clone();
        let mut segments = identity.split('/').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{segment}.json"));
            }
        }
        path
    }
}

/// Per-test snapshot handle; numbering follows assertion order.
#[derive(Debug)]
pub struct Snapshot {
    /// Backing store.
    store: SnapshotStore,
    /// Base identity `<suite>/<test>`.
    identity: String,
    /// Number of assertions made so far.
    assertions: usize,
}

impl Snapshot {
    /// Compares `value` against the next snapshot of this test.
    ///
    /// The first assertion uses the base identity; later ones append `.1`,
    /// `.2`, and so on.
    ///
    /// # Errors
    ///
    /// See [`SnapshotStore::compare`].
    pub fn assert_match(
        &mut self,
        value: &Value,
        masks: &Masks,
    ) -> Result<SnapshotOutcome, SnapshotError> {
        let identity = if self.assertions == 0 {
            self.identity.clone()
        } else {
            format!("{}.{}", self.identity, self.assertions)
        };
        self.assertions += 1;
        self.store.compare(&identity, value, masks)
    }

    /// Returns the base identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Replaces characters that are unsafe in file names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '[' | ']' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns canonical JSON bytes.
fn canonical(value: &Value) -> Result<Vec<u8>, SnapshotError> {
    serde_jcs::to_vec(value).map_err(|err| SnapshotError::Canonical(err.to_string()))
}

/// Reads a stored snapshot, returning `None` when absent.
fn read_snapshot(path: &Path) -> Result<Option<Value>, SnapshotError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(SnapshotError::Io(format!("{}: {err}", path.display()))),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|err| SnapshotError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Writes a snapshot as pretty JSON with sorted keys.
fn write_snapshot(path: &Path, value: &Value) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| SnapshotError::Io(format!("{}: {err}", parent.display())))?;
    }
    let mut text = serde_json::to_string_pretty(&sorted(value))
        .map_err(|err| SnapshotError::Canonical(err.to_string()))?;
    text.push('\n');
    fs::write(path, text).map_err(|err| SnapshotError::Io(format!("{}: {err}", path.display())))
}

/// Rebuilds objects with keys inserted in sorted order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::new();
            for key in keys {
                if let Some(child) = map.get(key) {
                    out.insert(key.clone(), sorted(child));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
