// system-tests/src/fixtures/bases.rs
// ============================================================================
// Module: Base Fixture
// Description: A fresh base in a fresh group, with its base access token.
// Purpose: Provide an isolated base for table and row operations.
// Dependencies: seatable-harness, serde_json
// ============================================================================

//! ## Overview
//! [`Base::create`] chains group creation, base creation, and the base token
//! exchange. Teardown deletes the base first and the group second.

// ============================================================================
// SECTION: Imports
// ============================================================================

use seatable_harness::CaseOverrides;
use seatable_harness::Secret;
use serde_json::json;

use super::FixtureError;
use super::context::Document;
use super::context::Harness;
use super::groups::GroupInfo;
use super::groups::create_group;
use super::groups::delete_base;
use super::guard::Teardown;
use super::guard::setup_failed;
use super::require_str;
use crate::naming::NAME_PREFIX;
use crate::naming::unique_name;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A fresh base and the token that grants access to it.
pub struct Base<'h> {
    /// Base UUID.
    pub uuid: String,
    /// Base name.
    pub name: String,
    /// Identifiers of the owning group.
    pub group: GroupInfo,
    /// Base access token.
    token: Secret,
    /// Pending deletions.
    teardown: Teardown<'h>,
}

impl<'h> Base<'h> {
    /// Creates a group, a base inside its workspace, and a base token.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when any step fails. Resources created before
    /// the failing step are deleted before the error returns.
    pub fn create(harness: &'h Harness) -> Result<Self, FixtureError> {
        let account_token = harness.account_token()?;
        let mut teardown = Teardown::new(harness);
        let group = create_group(&mut teardown, &account_token, &unique_name())?;
        let name = NAME_PREFIX.to_string();

        let uuid = harness
            .invoke(
                "base",
                Document::UserAccountOperations,
                "createBase",
                CaseOverrides::new()
                    .body(json!({"workspace_id": group.workspace_id, "name": name}))
                    .bearer(&account_token)
                    .expect_status(201),
            )
            .and_then(|response| response.json().map_err(|err| FixtureError::setup("base", err.to_string())))
            .and_then(|body| require_str(&body, "/table/uuid", "base"))
            .map_err(|err| setup_failed(harness, "base", err))?;
        let owner = account_token.clone();
        let base_name = name.clone();
        teardown.track("base", uuid.clone(), move |harness| {
            delete_base(harness, &owner, group.workspace_id, &base_name)
        });

        let token = base_token(harness, &account_token, group.workspace_id, &name)
            .map_err(|err| setup_failed(harness, "base_token", err))?;
        Ok(Self {
            uuid,
            name,
            group,
            token,
            teardown,
        })
    }

    /// Returns the base access token.
    #[must_use]
    pub const fn token(&self) -> &Secret {
        &self.token
    }

    /// Returns the id of the workspace holding the base.
    #[must_use]
    pub const fn workspace_id(&self) -> i64 {
        self.group.workspace_id
    }

    /// Deletes the base and its group now.
    ///
    /// # Errors
    ///
    /// Returns the first [`FixtureError::Teardown`].
    pub fn release(self) -> Result<(), FixtureError> {
        self.teardown.release()
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Exchanges the account token for a base access token.
fn base_token(
    harness: &Harness,
    account_token: &Secret,
    workspace_id: i64,
    base_name: &str,
) -> Result<Secret, FixtureError> {
    let response = harness.invoke(
        "base_token",
        Document::Authentication,
        "getBaseTokenWithAccountToken",
        CaseOverrides::new()
            .path_param("workspace_id", workspace_id)
            .path_param("base_name", base_name)
            .bearer(account_token)
            .expect_status(200),
    )?;
    let body = response.json().map_err(|err| FixtureError::setup("base_token", err.to_string()))?;
    require_str(&body, "/access_token", "base_token").map(Secret::new)
}
