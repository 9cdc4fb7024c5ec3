// crates/seatable-harness/src/secret.rs
// ============================================================================
// Module: Secret Handle
// Description: Opaque wrapper for credentials and bearer tokens.
// Purpose: Keep credential values out of logs, errors, and assertion diffs.
// Dependencies: subtle
// ============================================================================

//! ## Overview
//! [`Secret`] wraps account passwords, account tokens, and base tokens. Its
//! `Debug` and `Display` renderings are a fixed redacted constant, so a secret
//! embedded in any harness type can be formatted without exposing the value.
//! Equality is constant time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use subtle::ConstantTimeEq;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed rendering used for every secret.
pub const REDACTED: &str = "Secret(********)";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Opaque credential value.
///
/// # Invariants
/// - Formatting never reveals the wrapped value.
#[derive(Clone)]
pub struct Secret {
    /// Raw credential value.
    value: String,
}

impl Secret {
    /// Wraps a credential value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the raw value for placement into a request.
    ///
    /// Callers must only hand the result to the HTTP layer.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.value
    }

    /// Renders the `Authorization` header value for bearer authentication.
    #[must_use]
    pub fn bearer_value(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Returns true when the wrapped value is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.value.as_bytes().ct_eq(other.value.as_bytes()).into()
    }
}

impl Eq for Secret {}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
