// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for SeaTable system tests.
// Purpose: Provide typed access to credentials, endpoints, and defaults.
// Dependencies: seatable-harness
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables and mapped into
//! small typed structures for reuse across fixtures and suites. Credentials
//! are wrapped in [`seatable_harness::Secret`] as soon as they are read.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::Credentials;
pub use env::DEFAULT_BASE_URL;
pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
