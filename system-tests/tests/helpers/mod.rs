// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for the SeaTable conformance suites.
// Purpose: Provide the per-binary harness, snapshot assertions, and assets.
// Dependencies: system-tests, seatable-harness
// ============================================================================

//! ## Overview
//! Shared helpers for the SeaTable conformance suites.
//! Invariants:
//! - One [`system_tests::fixtures::Harness`] per test binary; configuration
//!   errors fail every test before any remote call.
//! - Credentials never appear in assertion messages.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod assets;
pub mod harness;
pub mod snapshots;
