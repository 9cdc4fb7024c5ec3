// system-tests/src/fixtures/context.rs
// ============================================================================
// Module: Fixture Harness Context
// Description: Shared schemas, client, snapshot store, and account tokens.
// Purpose: Build everything a suite needs once per test binary.
// Dependencies: seatable-harness
// ============================================================================

//! ## Overview
//! [`Harness`] bundles the loaded API description documents, the validating
//! client, and the snapshot store. Account tokens are fetched lazily on first
//! use and then shared read-only for the lifetime of the harness.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;
use std::sync::OnceLock;

use seatable_harness::ApiClient;
use seatable_harness::ApiResponse;
use seatable_harness::CallAuditSink;
use seatable_harness::Case;
use seatable_harness::CaseOverrides;
use seatable_harness::FileAuditSink;
use seatable_harness::FixtureAuditEvent;
use seatable_harness::HarnessSettings;
use seatable_harness::Operation;
use seatable_harness::SchemaSet;
use seatable_harness::Secret;
use seatable_harness::SnapshotStore;
use seatable_harness::StderrAuditSink;
use seatable_harness::audit::FixtureAuditEventParams;
use seatable_harness::audit::FixtureOutcome;
use seatable_harness::audit::FixturePhase;
use seatable_harness::make_case;

use super::FixtureError;
use super::accounts;
use crate::config::Credentials;
use crate::config::SystemTestConfig;

// ============================================================================
// SECTION: Documents
// ============================================================================

/// API description documents the suites load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Document {
    /// Login and token exchange.
    Authentication,
    /// Operations of an ordinary user account.
    UserAccountOperations,
    /// Operations of the system administrator.
    SystemAdminAccountOperations,
    /// Operations of a team administrator.
    TeamAdminAccountOperations,
    /// Current base (table/row) operations.
    BaseOperations,
    /// Deprecated base operations still served by the API gateway.
    BaseOperationsDeprecated,
    /// File and upload-link operations.
    FileOperations,
}

impl Document {
    /// Every document, in load order.
    pub const ALL: [Self; 7] = [
        Self::Authentication,
        Self::UserAccountOperations,
        Self::SystemAdminAccountOperations,
        Self::TeamAdminAccountOperations,
        Self::BaseOperations,
        Self::BaseOperationsDeprecated,
        Self::FileOperations,
    ];

    /// Returns the logical name, which is also the file stem on disk.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::UserAccountOperations => "user_account_operations",
            Self::SystemAdminAccountOperations => "system_admin_account_operations",
            Self::TeamAdminAccountOperations => "team_admin_account_operations",
            Self::BaseOperations => "base_operations",
            Self::BaseOperationsDeprecated => "base_operations_deprecated",
            Self::FileOperations => "file_operations",
        }
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Shared state for one test binary.
pub struct Harness {
    /// Account credentials.
    credentials: Credentials,
    /// Loaded API description documents.
    schemas: SchemaSet,
    /// Validating client.
    client: ApiClient,
    /// Snapshot store.
    snapshots: SnapshotStore,
    /// Ordinary user token, fetched on first use.
    user_token: OnceLock<Secret>,
    /// System administrator token, fetched on first use.
    admin_token: OnceLock<Secret>,
}

impl Harness {
    /// Assembles a harness from already-built parts.
    #[must_use]
    pub fn new(
        credentials: Credentials,
        schemas: SchemaSet,
        client: ApiClient,
        snapshots: SnapshotStore,
    ) -> Self {
        Self {
            credentials,
            schemas,
            client,
            snapshots,
            user_token: OnceLock::new(),
            admin_token: OnceLock::new(),
        }
    }

    /// Builds a harness from the `SEATABLE_*` environment.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Config`] when a credential is missing, a
    /// setting is invalid, or any API description document fails to load.
    pub fn from_env() -> Result<Self, FixtureError> {
        let config = SystemTestConfig::load().map_err(FixtureError::Config)?;
        let credentials = Credentials::load().map_err(FixtureError::Config)?;
        Self::from_config(&config, credentials)
    }

    /// Builds a harness from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Config`] when settings, the audit log, or the
    /// API description documents cannot be loaded.
    pub fn from_config(config: &SystemTestConfig, credentials: Credentials) -> Result<Self, FixtureError> {
        let mut settings = HarnessSettings::load(config.harness_config.as_deref())
            .map_err(|err| FixtureError::Config(err.to_string()))?;
        if let Some(timeout) = config.timeout {
            settings.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            settings.connect_timeout_ms = settings.connect_timeout_ms.min(settings.timeout_ms);
            settings.validate().map_err(|err| FixtureError::Config(err.to_string()))?;
        }
        let audit: Arc<dyn CallAuditSink> = match &config.audit_log {
            Some(path) => Arc::new(open_audit_log(path)?),
            None => Arc::new(StderrAuditSink),
        };
        let names: Vec<&str> = Document::ALL.iter().map(|document| document.name()).collect();
        let schemas = SchemaSet::load_dir(&config.schema_dir, &names, &config.base_url)
            .map_err(|err| FixtureError::Config(err.to_string()))?;
        let snapshot_root =
            config.snapshot_dir.clone().unwrap_or_else(|| settings.snapshot_root.clone());
        let snapshots = SnapshotStore::new(snapshot_root, config.update_snapshots);
        let client = ApiClient::new(settings, audit).map_err(|err| FixtureError::Config(err.to_string()))?;
        Ok(Self::new(credentials, schemas, client, snapshots))
    }

    /// Returns the validating client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Returns the loaded documents.
    #[must_use]
    pub const fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Returns the snapshot store.
    #[must_use]
    pub const fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Returns the account credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Looks up an operation.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Lookup`] when the document or operation is
    /// unknown.
    pub fn operation(&self, document: Document, id: &str) -> Result<Arc<Operation>, FixtureError> {
        self.schemas
            .operation(document.name(), id)
            .map_err(|err| FixtureError::lookup(document.name(), err.to_string()))
    }

    /// Materialises a case for an operation.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Lookup`] for unknown operations and
    /// [`FixtureError::Setup`] when the overrides do not fit the operation.
    pub fn case(&self, document: Document, id: &str, overrides: CaseOverrides) -> Result<Case, FixtureError> {
        let operation = self.operation(document, id)?;
        make_case(&operation, overrides).map_err(|err| FixtureError::setup(id, err.to_string()))
    }

    /// Runs a validated call on behalf of a fixture.
    pub(crate) fn invoke(
        &self,
        resource: &str,
        document: Document,
        id: &str,
        overrides: CaseOverrides,
    ) -> Result<ApiResponse, FixtureError> {
        let case = self.case(document, id, overrides)?;
        self.client.call_and_validate(&case).map_err(|err| FixtureError::setup(resource, err.to_string()))
    }

    /// Returns the ordinary user's account token, logging in on first use.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Setup`] when the login fails.
    pub fn account_token(&self) -> Result<Secret, FixtureError> {
        cached_login(&self.user_token, || {
            accounts::login(self, &self.credentials.username, &self.credentials.password)
        })
    }

    /// Returns the system administrator's account token, logging in on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Setup`] when the login fails.
    pub fn admin_account_token(&self) -> Result<Secret, FixtureError> {
        cached_login(&self.admin_token, || {
            accounts::login(self, &self.credentials.admin_username, &self.credentials.admin_password)
        })
    }

    /// Records a fixture lifecycle event on the client's audit sink.
    pub(crate) fn record_fixture(
        &self,
        resource: &str,
        id: Option<&str>,
        phase: FixturePhase,
        error: Option<&FixtureError>,
    ) {
        let outcome = if error.is_some() { FixtureOutcome::Failed } else { FixtureOutcome::Ok };
        self.client.audit().record_fixture(&FixtureAuditEvent::new(FixtureAuditEventParams {
            resource: resource.to_string(),
            id: id.map(str::to_string),
            phase,
            outcome,
            error: error.map(|err| err.message().to_string()),
        }));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the cached token or stores the result of `login`.
///
/// Concurrent first calls may both log in; the first stored token wins.
fn cached_login(
    slot: &OnceLock<Secret>,
    login: impl FnOnce() -> Result<Secret, FixtureError>,
) -> Result<Secret, FixtureError> {
    if let Some(token) = slot.get() {
        return Ok(token.clone());
    }
    let token = login()?;
    Ok(slot.get_or_init(|| token).clone())
}

/// Opens the JSON-lines audit log.
fn open_audit_log(path: &Path) -> Result<FileAuditSink, FixtureError> {
    FileAuditSink::new(path).map_err(|err| FixtureError::Config(format!("{}: {err}", path.display())))
}
