// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Shared Harness
// Description: Lazily built harness shared by every test in a binary.
// Purpose: Load configuration, credentials, and API documents exactly once.
// Dependencies: system-tests
// ============================================================================

use std::sync::OnceLock;

use system_tests::fixtures::FixtureError;
use system_tests::fixtures::Harness;

static HARNESS: OnceLock<Result<Harness, FixtureError>> = OnceLock::new();

/// Returns the shared harness, building it from the environment on first use.
///
/// A configuration error is cached, so every later test fails with the same
/// message without retrying the load.
pub fn shared() -> Result<&'static Harness, FixtureError> {
    HARNESS.get_or_init(Harness::from_env).as_ref().map_err(Clone::clone)
}
