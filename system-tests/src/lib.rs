// system-tests/src/lib.rs
// ============================================================================
// Module: SeaTable System Tests Library
// Description: Shared configuration, fixtures, and catalogs for remote suites.
// Purpose: Provide common utilities for the SeaTable conformance binaries.
// Dependencies: seatable-harness, rand, time
// ============================================================================

//! ## Overview
//! This crate hosts the environment configuration, the fixture lifecycle
//! manager, and the column/row catalogs used by the remote suites in
//! `system-tests/tests`. The suites themselves only build with the
//! `system-tests` feature, so a plain `cargo test` never reaches the network.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod data;
pub mod fixtures;
pub mod naming;
