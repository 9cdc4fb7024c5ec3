// crates/seatable-harness/src/settings.rs
// ============================================================================
// Module: Harness Settings
// Description: TOML-backed settings for the HTTP client and snapshot store.
// Purpose: Provide bounded, validated defaults for every harness run.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! [`HarnessSettings`] controls request timeouts, redirect handling, response
//! size limits, and the snapshot root. Settings load fail-closed: oversized,
//! non UTF-8, or out-of-range documents are rejected before any test runs.
//! Every timeout is finite so no call can block indefinitely.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum settings file size in bytes.
const MAX_SETTINGS_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for request and connect timeouts.
pub const MAX_TIMEOUT_MS: u64 = 300_000;
/// Upper bound for the response body limit.
const MAX_RESPONSE_BYTES_LIMIT: usize = 256 * 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessSettings {
    /// Overall request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Whether HTTP redirects are followed.
    #[serde(default)]
    pub follow_redirects: bool,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Directory holding stored snapshots.
    #[serde(default = "default_snapshot_root")]
    pub snapshot_root: PathBuf,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            follow_redirects: false,
            user_agent: default_user_agent(),
            max_response_bytes: default_max_response_bytes(),
            snapshot_root: default_snapshot_root(),
        }
    }
}

impl HarnessSettings {
    /// Loads settings from a TOML file, or returns defaults when `path` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the file cannot be read, parsed, or
    /// fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| SettingsError::Io(err.to_string()))?;
        if bytes.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(SettingsError::Invalid("settings file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| SettingsError::Invalid("settings file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self =
            toml::from_str(content).map_err(|err| SettingsError::Parse(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(SettingsError::Invalid(format!(
                "timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.connect_timeout_ms == 0 || self.connect_timeout_ms > self.timeout_ms {
            return Err(SettingsError::Invalid(
                "connect_timeout_ms must be between 1 and timeout_ms".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SettingsError::Invalid("user_agent must be non-empty".to_string()));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(SettingsError::Invalid(format!(
                "max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        if self.snapshot_root.as_os_str().is_empty() {
            return Err(SettingsError::Invalid("snapshot_root must be non-empty".to_string()));
        }
        validate_path(&self.snapshot_root)
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Settings loading errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// I/O failure while reading settings.
    #[error("settings io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("settings parse error: {0}")]
    Parse(String),
    /// Invalid settings data.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default connect timeout.
const fn default_connect_timeout_ms() -> u64 {
    10_000
}

/// Default response body limit.
const fn default_max_response_bytes() -> usize {
    16 * 1024 * 1024
}

/// Default user agent.
fn default_user_agent() -> String {
    format!("seatable-harness/{}", env!("CARGO_PKG_VERSION"))
}

/// Default snapshot directory.
fn default_snapshot_root() -> PathBuf {
    PathBuf::from("tests/__snapshots__")
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), SettingsError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SettingsError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SettingsError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}
