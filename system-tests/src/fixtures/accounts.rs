// system-tests/src/fixtures/accounts.rs
// ============================================================================
// Module: Account Fixtures
// Description: Username/password login returning an account token.
// Purpose: Obtain bearer tokens without exposing credentials.
// Dependencies: seatable-harness, serde_json
// ============================================================================

//! ## Overview
//! Tokens come back wrapped in [`Secret`]. Neither the request body nor the
//! token appears in errors or audit events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use seatable_harness::CaseOverrides;
use seatable_harness::Secret;
use serde_json::json;

use super::FixtureError;
use super::context::Document;
use super::context::Harness;
use super::require_str;

// ============================================================================
// SECTION: Login
// ============================================================================

/// Operation exchanging a username and password for an account token.
pub const LOGIN_OPERATION: &str = "getAccountTokenfromUsername";

/// Logs in and returns the account token.
///
/// # Errors
///
/// Returns [`FixtureError::Setup`] when the call fails or the response has no
/// string `token`.
pub fn login(harness: &Harness, username: &Secret, password: &Secret) -> Result<Secret, FixtureError> {
    let body = json!({
        "username": username.expose_secret(),
        "password": password.expose_secret(),
    });
    let response = harness.invoke(
        "account_token",
        Document::Authentication,
        LOGIN_OPERATION,
        CaseOverrides::new().body(body).expect_status(200),
    )?;
    let payload = response.json().map_err(|err| FixtureError::setup("account_token", err.to_string()))?;
    require_str(&payload, "/token", "account_token").map(Secret::new)
}
