// system-tests/src/fixtures/groups.rs
// ============================================================================
// Module: Group and Workspace Fixtures
// Description: Fresh groups and the workspace each group owns.
// Purpose: Give every test an isolated workspace to create bases in.
// Dependencies: seatable-harness, serde_json
// ============================================================================

//! ## Overview
//! Group creation does not return the workspace id, so it is resolved by
//! scanning the workspace listing for the new group's id. The group deletion
//! is registered before that lookup so a failed lookup still cleans up.

// ============================================================================
// SECTION: Imports
// ============================================================================

use seatable_harness::CaseOverrides;
use seatable_harness::Secret;
use serde_json::Value;
use serde_json::json;

use super::FixtureError;
use super::context::Document;
use super::context::Harness;
use super::guard::Teardown;
use super::guard::setup_failed;
use super::require_i64;
use crate::naming::unique_name;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Identifiers of a created group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupInfo {
    /// Group id.
    pub group_id: i64,
    /// Id of the workspace owned by the group.
    pub workspace_id: i64,
}

/// A fresh group owned by the ordinary user.
pub struct Group<'h> {
    /// Group identifiers.
    pub info: GroupInfo,
    /// Group name.
    pub name: String,
    /// Pending deletions.
    teardown: Teardown<'h>,
}

impl<'h> Group<'h> {
    /// Creates a uniquely named group.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when login, creation, or the workspace
    /// lookup fails. A created group is deleted before the error returns.
    pub fn create(harness: &'h Harness) -> Result<Self, FixtureError> {
        let token = harness.account_token()?;
        let name = unique_name();
        let mut teardown = Teardown::new(harness);
        let info = create_group(&mut teardown, &token, &name)?;
        Ok(Self {
            info,
            name,
            teardown,
        })
    }

    /// Deletes the group now.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Teardown`] when the deletion fails.
    pub fn release(self) -> Result<(), FixtureError> {
        self.teardown.release()
    }
}

/// Workspace of a fresh group, cleaned of one known base at teardown.
pub struct Workspace<'h> {
    /// Group identifiers.
    pub info: GroupInfo,
    /// Base name the test is expected to create.
    pub base_name: String,
    /// Pending deletions.
    teardown: Teardown<'h>,
}

impl<'h> Workspace<'h> {
    /// Creates a group and registers deletion of `base_name` inside its
    /// workspace, followed by the group itself.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the group cannot be created.
    pub fn create(harness: &'h Harness, base_name: &str) -> Result<Self, FixtureError> {
        let token = harness.account_token()?;
        let mut teardown = Teardown::new(harness);
        let info = create_group(&mut teardown, &token, &unique_name())?;
        let base = base_name.to_string();
        teardown.defer("base", base_name, move |harness| {
            delete_base(harness, &token, info.workspace_id, &base)
        });
        Ok(Self {
            info,
            base_name: base_name.to_string(),
            teardown,
        })
    }

    /// Returns the workspace id.
    #[must_use]
    pub const fn workspace_id(&self) -> i64 {
        self.info.workspace_id
    }

    /// Deletes the base and the group now.
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

/// Creates a group, registers its deletion, and resolves its workspace.
pub(crate) fn create_group(
    teardown: &mut Teardown<'_>,
    token: &Secret,
    name: &str,
) -> Result<GroupInfo, FixtureError> {
    let harness = teardown.harness();
    let response = harness
        .invoke(
            "group",
            Document::UserAccountOperations,
            "createGroup",
            CaseOverrides::new().body(json!({"name": name})).bearer(token).expect_status(201),
        )
        .map_err(|err| setup_failed(harness, "group", err))?;
    let group_id = response
        .json()
        .map_err(|err| FixtureError::setup("group", err.to_string()))
        .and_then(|body| require_i64(&body, "/id", "group"))
        .map_err(|err| setup_failed(harness, "group", err))?;
    let owner = token.clone();
    teardown.track("group", group_id.to_string(), move |harness| delete_group(harness, &owner, group_id));

    let workspace_id =
        workspace_of_group(harness, token, group_id).map_err(|err| setup_failed(harness, "workspace", err))?;
    Ok(GroupInfo {
        group_id,
        workspace_id,
    })
}

/// Scans the workspace listing for the workspace owned by `group_id`.
fn workspace_of_group(harness: &Harness, token: &Secret, group_id: i64) -> Result<i64, FixtureError> {
    let response = harness.invoke(
        "workspace",
        Document::UserAccountOperations,
        "listWorkspaces",
        CaseOverrides::new().bearer(token).expect_status(200),
    )?;
    let body = response.json().map_err(|err| FixtureError::setup("workspace", err.to_string()))?;
    find_workspace(&body, group_id)
        .ok_or_else(|| FixtureError::lookup("workspace", format!("no workspace references group {group_id}")))
}

/// Returns the id of the `workspace_list` entry whose `group_id` matches.
pub(crate) fn find_workspace(listing: &Value, group_id: i64) -> Option<i64> {
    listing
        .get("workspace_list")?
        .as_array()?
        .iter()
        .find(|workspace| workspace.get("group_id").and_then(Value::as_i64) == Some(group_id))
        .and_then(|workspace| workspace.get("id"))
        .and_then(Value::as_i64)
}

/// Deletes a group.
fn delete_group(harness: &Harness, token: &Secret, group_id: i64) -> Result<(), FixtureError> {
    harness
        .invoke(
            "group",
            Document::UserAccountOperations,
            "deleteGroup",
            CaseOverrides::new().path_param("group_id", group_id).bearer(token).expect_status(200),
        )
        .map(|_| ())
}

/// Deletes a base by name from a workspace.
pub(crate) fn delete_base(
    harness: &Harness,
    token: &Secret,
    workspace_id: i64,
    name: &str,
) -> Result<(), FixtureError> {
    harness
        .invoke(
            "base",
            Document::UserAccountOperations,
            "deleteBase",
            CaseOverrides::new()
                .path_param("workspace_id", workspace_id)
                .body(json!({"name": name}))
                .bearer(token)
                .expect_status(200),
        )
        .map(|_| ())
}
