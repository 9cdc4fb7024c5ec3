// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: seatable-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. The four account variables
//! are mandatory; every other setting has a default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use seatable_harness::Secret;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Base URL used when `SEATABLE_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://stage.seatable.io";

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Ordinary user login.
    Username,
    /// Ordinary user password.
    Password,
    /// System administrator login.
    AdminUsername,
    /// System administrator password.
    AdminPassword,
    /// Optional server base URL override.
    BaseUrl,
    /// Optional directory holding the API description documents.
    SchemaDir,
    /// Optional snapshot root override.
    SnapshotDir,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Rewrite stored snapshots (`true`/`false` or `1`/`0`).
    UpdateSnapshots,
    /// Optional path of a JSON-lines audit log.
    AuditLog,
    /// Optional path of the harness TOML settings.
    HarnessConfig,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Username => "SEATABLE_USERNAME",
            Self::Password => "SEATABLE_PASSWORD",
            Self::AdminUsername => "SEATABLE_ADMIN_USERNAME",
            Self::AdminPassword => "SEATABLE_ADMIN_PASSWORD",
            Self::BaseUrl => "SEATABLE_BASE_URL",
            Self::SchemaDir => "SEATABLE_SCHEMA_DIR",
            Self::SnapshotDir => "SEATABLE_SNAPSHOT_DIR",
            Self::TimeoutSeconds => "SEATABLE_TIMEOUT_SEC",
            Self::UpdateSnapshots => "SEATABLE_UPDATE_SNAPSHOTS",
            Self::AuditLog => "SEATABLE_AUDIT_LOG",
            Self::HarnessConfig => "SEATABLE_HARNESS_CONFIG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestConfig {
    /// Server base URL every document is bound to.
    pub base_url: String,
    /// Directory holding the API description documents.
    pub schema_dir: PathBuf,
    /// Optional snapshot root override.
    pub snapshot_dir: Option<PathBuf>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Rewrite stored snapshots instead of comparing.
    pub update_snapshots: bool,
    /// Optional JSON-lines audit log path.
    pub audit_log: Option<PathBuf>,
    /// Optional harness settings path.
    pub harness_config: Option<PathBuf>,
}

impl Default for SystemTestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            schema_dir: PathBuf::from("."),
            snapshot_dir: None,
            timeout: None,
            update_snapshots: false,
            audit_log: None,
            harness_config: None,
        }
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        let base_url = read_env_nonempty(SystemTestEnv::BaseUrl.as_str())?
            .map_or_else(|| DEFAULT_BASE_URL.to_string(), |value| value.trim().to_string());
        let schema_dir = read_env_nonempty(SystemTestEnv::SchemaDir.as_str())?
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let snapshot_dir = read_env_nonempty(SystemTestEnv::SnapshotDir.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let update_snapshots = parse_bool_env(
            SystemTestEnv::UpdateSnapshots.as_str(),
            read_env_nonempty(SystemTestEnv::UpdateSnapshots.as_str())?,
        )?;
        let audit_log = read_env_nonempty(SystemTestEnv::AuditLog.as_str())?.map(PathBuf::from);
        let harness_config =
            read_env_nonempty(SystemTestEnv::HarnessConfig.as_str())?.map(PathBuf::from);
        Ok(Self {
            base_url,
            schema_dir,
            snapshot_dir,
            timeout,
            update_snapshots,
            audit_log,
            harness_config,
        })
    }
}

/// Account credentials for the ordinary user and the system administrator.
///
/// # Invariants
/// - Every value is held as a [`Secret`]; `Debug` output is redacted.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    /// Ordinary user login.
    pub username: Secret,
    /// Ordinary user password.
    pub password: Secret,
    /// System administrator login.
    pub admin_username: Secret,
    /// System administrator password.
    pub admin_password: Secret,
}

impl Credentials {
    /// Loads the four required account variables.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable that is unset, empty, or
    /// not valid UTF-8. The error never contains a value.
    pub fn load() -> Result<Self, String> {
        Ok(Self {
            username: read_required(SystemTestEnv::Username)?,
            password: read_required(SystemTestEnv::Password)?,
            admin_username: read_required(SystemTestEnv::AdminUsername)?,
            admin_password: read_required(SystemTestEnv::AdminPassword)?,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Reads a mandatory credential variable into a [`Secret`].
fn read_required(key: SystemTestEnv) -> Result<Secret, String> {
    let name = key.as_str();
    read_env_nonempty(name)?
        .map(Secret::new)
        .ok_or_else(|| format!("{name} environment variable is not set"))
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
