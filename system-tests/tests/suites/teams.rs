// system-tests/tests/suites/teams.rs
// ============================================================================
// Module: Team Administration Tests
// Description: Team creation, role updates, and team user management.
// Purpose: Validate system-admin and team-admin endpoints.
// Dependencies: system-tests helpers
// ============================================================================

use std::error::Error;

use seatable_harness::ApiResponse;
use seatable_harness::CaseOverrides;
use seatable_harness::JsonType;
use seatable_harness::Masks;
use serde_json::Value;
use serde_json::json;
use system_tests::fixtures::Document;
use system_tests::fixtures::Harness;
use system_tests::fixtures::Team;
use system_tests::fixtures::TeamNameReservation;
use system_tests::fixtures::TeamUser;
use system_tests::naming::account_email;
use system_tests::naming::generate_password;
use system_tests::naming::unique_slug;

use crate::helpers::harness::shared;
use crate::helpers::snapshots::assert_snapshot;
use crate::helpers::snapshots::list_fields;

const SUITE: &str = "teams";

/// Runs a validated call.
fn call(
    harness: &Harness,
    document: Document,
    operation_id: &str,
    overrides: CaseOverrides,
) -> Result<ApiResponse, Box<dyn Error>> {
    let case = harness.case(document, operation_id, overrides)?;
    Ok(harness.client().call_and_validate(&case)?)
}

#[test]
fn add_team() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let reservation = TeamNameReservation::create(harness)?;
    let admin_token = harness.admin_account_token()?;
    let overrides = CaseOverrides::new()
        .body(json!({
            "org_name": reservation.name,
            "admin_email": account_email(&unique_slug("team-admin")),
            "password": generate_password().expose_secret(),
            "with_workspace": true,
        }))
        .bearer(&admin_token)
        .expect_status(200);
    call(harness, Document::SystemAdminAccountOperations, "addTeam", overrides)?;
    reservation.release()?;
    Ok(())
}

#[test]
fn update_team_modify_role() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let team = Team::create(harness)?;
    let admin_token = harness.admin_account_token()?;
    let overrides = CaseOverrides::new()
        .path_param("org_id", team.team_id)
        .body(json!({"role": "org_enterprise"}))
        .bearer(&admin_token)
        .expect_status(200);
    let updated = call(harness, Document::SystemAdminAccountOperations, "updateTeam", overrides)?.json()?;
    if updated.get("role").and_then(Value::as_str) != Some("org_enterprise") {
        return Err("team role was not updated to org_enterprise".into());
    }
    team.release()?;
    Ok(())
}

#[test]
fn add_team_user() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let team = Team::create(harness)?;
    let admin_token = harness.admin_account_token()?;
    let username = unique_slug("user");
    let overrides = CaseOverrides::new()
        .path_param("org_id", team.team_id)
        .body(json!({
            "email": account_email(&username),
            "password": generate_password().expose_secret(),
            "name": username,
        }))
        .bearer(&admin_token)
        .expect_status(200);
    // The user is removed together with the team.
    call(harness, Document::SystemAdminAccountOperations, "addTeamUser", overrides)?;
    team.release()?;
    Ok(())
}

#[test]
fn update_user() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let team = Team::create(harness)?;
    let user = TeamUser::create(harness, &team, &unique_slug("user"))?;
    let overrides = CaseOverrides::new()
        .path_param("org_id", team.team_id)
        .path_param("user_id", user.email.as_str())
        .body(json!({"name": "updated-name"}))
        .bearer(team.admin_token())
        .expect_status(200);
    let updated = call(harness, Document::TeamAdminAccountOperations, "updateUser", overrides)?.json()?;
    if updated.get("name").and_then(Value::as_str) != Some("updated-name") {
        return Err("user name was not updated".into());
    }
    user.release()?;
    team.release()?;
    Ok(())
}

#[test]
fn list_team_users() -> Result<(), Box<dyn Error>> {
    let harness = shared()?;
    let team = Team::create(harness)?;
    let overrides = CaseOverrides::new()
        .path_param("org_id", team.team_id)
        .bearer(team.admin_token())
        .expect_status(200);
    let listing = call(harness, Document::TeamAdminAccountOperations, "listTeamUsers", overrides)?.json()?;

    let users = listing.get("user_list").and_then(Value::as_array).map_or(0, Vec::len);
    if users != 1 {
        return Err(format!("expected only the team admin, found {users} users").into());
    }
    let masks = Masks::new()
        .type_only_regex(&list_fields("user_list", "ctime|email|name"), &[JsonType::String])?
        .type_only_regex(&list_fields("user_list", "id|workspace_id"), &[JsonType::Integer])?;
    assert_snapshot(harness, SUITE, "list_team_users", &listing, &masks)?;
    team.release()?;
    Ok(())
}
