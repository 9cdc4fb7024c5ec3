// system-tests/src/fixtures/mod.rs
// ============================================================================
// Module: Fixture Lifecycle Manager
// Description: Scoped acquisition and release of remote SeaTable resources.
// Purpose: Create prerequisite state per test and always attempt its deletion.
// Dependencies: seatable-harness, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Fixtures create remote resources before a test body runs and register a
//! teardown step for each one with a [`Teardown`] guard. The guard runs the
//! steps in reverse order when it is dropped or released, so a base is
//! deleted before the group that owns its workspace.
//!
//! Account tokens are fetched once per [`Harness`] and shared read-only.
//! Setup failures abort with [`FixtureError::Setup`] or
//! [`FixtureError::Lookup`]; steps registered before the failure still run.
//! Teardown failures are audited and surface through `release()` as
//! [`FixtureError::Teardown`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod accounts;
pub mod bases;
mod context;
pub mod groups;
mod guard;
pub mod tables;
pub mod teams;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bases::Base;
pub use context::Document;
pub use context::Harness;
pub use groups::Group;
pub use groups::Workspace;
pub use guard::Teardown;
pub use teams::Team;
pub use teams::TeamNameReservation;
pub use teams::TeamUser;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fixture lifecycle errors.
///
/// # Invariants
/// - Messages never contain credential values or token strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// The environment or a local input is unusable.
    #[error("configuration error: {0}")]
    Config(String),
    /// A prerequisite resource could not be created.
    #[error("{resource} setup failed: {message}")]
    Setup {
        /// Resource kind.
        resource: String,
        /// Failure description.
        message: String,
    },
    /// A resource could not be deleted.
    #[error("{resource} teardown failed: {message}")]
    Teardown {
        /// Resource kind.
        resource: String,
        /// Failure description.
        message: String,
    },
    /// An operation, document, or expected remote id was not found.
    #[error("{resource} lookup failed: {message}")]
    Lookup {
        /// Resource kind.
        resource: String,
        /// Failure description.
        message: String,
    },
}

impl FixtureError {
    /// Builds a setup error.
    pub(crate) fn setup(resource: &str, message: impl Into<String>) -> Self {
        Self::Setup {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    /// Builds a lookup error.
    pub(crate) fn lookup(resource: &str, message: impl Into<String>) -> Self {
        Self::Lookup {
            resource: resource.to_string(),
            message: message.into(),
        }
    }

    /// Returns the failure description without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Config(message)
            | Self::Setup {
                message, ..
            }
            | Self::Teardown {
                message, ..
            }
            | Self::Lookup {
                message, ..
            } => message,
        }
    }
}

// ============================================================================
// SECTION: Response Fields
// ============================================================================

/// Reads an integer id at `pointer`.
pub(crate) fn require_i64(body: &Value, pointer: &str, resource: &str) -> Result<i64, FixtureError> {
    body.pointer(pointer)
        .and_then(Value::as_i64)
        .ok_or_else(|| FixtureError::setup(resource, format!("expected integer at {pointer}")))
}

/// Reads a string at `pointer`.
///
/// The value is never echoed into the error; some of these fields are tokens.
pub(crate) fn require_str(body: &Value, pointer: &str, resource: &str) -> Result<String, FixtureError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| FixtureError::setup(resource, format!("expected string at {pointer}")))
}
