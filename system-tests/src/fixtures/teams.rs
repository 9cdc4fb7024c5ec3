// system-tests/src/fixtures/teams.rs
// ============================================================================
// Module: Team Fixtures
// Description: Teams, reserved team names, and team users.
// Purpose: Provide isolated organizations for the team administration suites.
// Dependencies: seatable-harness, serde_json
// ============================================================================

//! ## Overview
//! Teams are created by the system administrator. [`Team`] also logs in as
//! the new team's administrator. [`TeamNameReservation`] covers tests that
//! create the team themselves: its teardown resolves the team id by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use seatable_harness::CaseOverrides;
use seatable_harness::Secret;
use serde_json::Value;
use serde_json::json;

use super::FixtureError;
use super::accounts::login;
use super::context::Document;
use super::context::Harness;
use super::guard::Teardown;
use super::guard::setup_failed;
use super::require_i64;
use super::require_str;
use crate::naming::account_email;
use crate::naming::generate_password;
use crate::naming::unique_slug;

// ============================================================================
// SECTION: Team
// ============================================================================

/// A fresh team and its administrator's account token.
pub struct Team<'h> {
    /// Team (organization) id.
    pub team_id: i64,
    /// Team name.
    pub name: String,
    /// Team administrator login.
    pub admin_email: String,
    /// Team administrator account token.
    admin_token: Secret,
    /// Pending deletions.
    teardown: Teardown<'h>,
}

impl<'h> Team<'h> {
    /// Creates a team with a workspace and logs in as its administrator.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when creation or the administrator login
    /// fails. A created team is deleted before the error returns.
    pub fn create(harness: &'h Harness) -> Result<Self, FixtureError> {
        let system_token = harness.admin_account_token()?;
        let name = unique_slug("org");
        let admin_email = account_email(&unique_slug("team-admin"));
        let password = generate_password();
        let mut teardown = Teardown::new(harness);

        let team_id = add_team(harness, &system_token, &name, &admin_email, &password)
            .map_err(|err| setup_failed(harness, "team", err))?;
        teardown.track("team", team_id.to_string(), move |harness| {
            delete_team(harness, &system_token, team_id)
        });

        let admin_token = login(harness, &Secret::new(admin_email.clone()), &password)
            .map_err(|err| setup_failed(harness, "team_admin_token", err))?;
        Ok(Self {
            team_id,
            name,
            admin_email,
            admin_token,
            teardown,
        })
    }

    /// Returns the team administrator's account token.
    #[must_use]
    pub const fn admin_token(&self) -> &Secret {
        &self.admin_token
    }

    /// Deletes the team now.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Teardown`] when the deletion fails.
    pub fn release(self) -> Result<(), FixtureError> {
        self.teardown.release()
    }
}

// ============================================================================
// SECTION: Team Name Reservation
// ============================================================================

/// A unique team name whose team is deleted at teardown.
pub struct TeamNameReservation<'h> {
    /// Reserved team name.
    pub name: String,
    /// Pending deletions.
    teardown: Teardown<'h>,
}

impl<'h> TeamNameReservation<'h> {
    /// Reserves a name; the test is expected to create the team.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the administrator login fails.
    pub fn create(harness: &'h Harness) -> Result<Self, FixtureError> {
        let system_token = harness.admin_account_token()?;
        let name = unique_slug("org");
        let mut teardown = Teardown::new(harness);
        let lookup_name = name.clone();
        teardown.defer("team", name.clone(), move |harness| {
            let team_id = team_id_by_name(harness, &system_token, &lookup_name)?;
            delete_team(harness, &system_token, team_id)
        });
        Ok(Self {
            name,
            teardown,
        })
    }

    /// Deletes the team carrying the reserved name now.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Teardown`] when no such team exists or the
    /// deletion fails.
    pub fn release(self) -> Result<(), FixtureError> {
        self.teardown.release()
    }
}

// ============================================================================
// SECTION: Team User
// ============================================================================

/// A user added to a team by its administrator.
pub struct TeamUser<'h> {
    /// Internal account address assigned by the server.
    pub email: String,
    /// Full response body of the creation call.
    pub user: Value,
    /// Pending deletions.
    teardown: Teardown<'h>,
}

impl<'h> TeamUser<'h> {
    /// Adds a user named `username` to `team`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the user cannot be created.
    pub fn create(harness: &'h Harness, team: &Team<'_>, username: &str) -> Result<Self, FixtureError> {
        let token = team.admin_token().clone();
        let team_id = team.team_id;
        let body = json!({
            "email": account_email(username),
            "password": generate_password().expose_secret(),
            "name": username,
        });
        let user = harness
            .invoke(
                "team_user",
                Document::TeamAdminAccountOperations,
                "addUser",
                CaseOverrides::new()
                    .path_param("org_id", team_id)
                    .body(body)
                    .bearer(&token)
                    .expect_status(200),
            )
            .and_then(|response| response.json().map_err(|err| FixtureError::setup("team_user", err.to_string())))
            .map_err(|err| setup_failed(harness, "team_user", err))?;
        let email = require_str(&user, "/email", "team_user").map_err(|err| setup_failed(harness, "team_user", err))?;
        let mut teardown = Teardown::new(harness);
        let user_id = email.clone();
        teardown.track("team_user", email.clone(), move |harness| {
            harness
                .invoke(
                    "team_user",
                    Document::TeamAdminAccountOperations,
                    "deleteUser",
                    CaseOverrides::new()
                        .path_param("org_id", team_id)
                        .path_param("user_id", user_id)
                        .bearer(&token)
                        .expect_status(200),
                )
                .map(|_| ())
        });
        Ok(Self {
            email,
            user,
            teardown,
        })
    }

    /// Deletes the user now.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Teardown`] when the deletion fails.
    pub fn release(self) -> Result<(), FixtureError> {
        self.teardown.release()
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Creates a team with a workspace and returns its id.
fn add_team(
    harness: &Harness,
    system_token: &Secret,
    name: &str,
    admin_email: &str,
    password: &Secret,
) -> Result<i64, FixtureError> {
    let response = harness.invoke(
        "team",
        Document::SystemAdminAccountOperations,
        "addTeam",
        CaseOverrides::new()
            .body(json!({
                "org_name": name,
                "admin_email": admin_email,
                "password": password.expose_secret(),
                "with_workspace": true,
            }))
            .bearer(system_token)
            .expect_status(200),
    )?;
    let body = response.json().map_err(|err| FixtureError::setup("team", err.to_string()))?;
    require_i64(&body, "/org_id", "team")
}

/// Resolves a team id from the team listing.
fn team_id_by_name(harness: &Harness, system_token: &Secret, name: &str) -> Result<i64, FixtureError> {
    let response = harness.invoke(
        "team",
        Document::SystemAdminAccountOperations,
        "listTeams",
        CaseOverrides::new().bearer(system_token).expect_status(200),
    )?;
    let body = response.json().map_err(|err| FixtureError::setup("team", err.to_string()))?;
    find_team(&body, name).ok_or_else(|| FixtureError::lookup("team", format!("no team named {name}")))
}

/// Returns the `org_id` of the `organizations` entry named `name`.
pub(crate) fn find_team(listing: &Value, name: &str) -> Option<i64> {
    listing
        .get("organizations")?
        .as_array()?
        .iter()
        .find(|team| team.get("org_name").and_then(Value::as_str) == Some(name))
        .and_then(|team| team.get("org_id"))
        .and_then(Value::as_i64)
}

/// Deletes a team.
fn delete_team(harness: &Harness, system_token: &Secret, team_id: i64) -> Result<(), FixtureError> {
    harness
        .invoke(
            "team",
            Document::SystemAdminAccountOperations,
            "deleteTeam",
            CaseOverrides::new().path_param("org_id", team_id).bearer(system_token).expect_status(200),
        )
        .map(|_| ())
}
