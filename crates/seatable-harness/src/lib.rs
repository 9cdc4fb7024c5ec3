// crates/seatable-harness/src/lib.rs
// ============================================================================
// Module: SeaTable Harness
// Description: Schema-driven API conformance harness.
// Purpose: Load API descriptions, synthesize requests, validate responses,
//          and compare bodies against masked snapshots.
// Dependencies: jsonschema, reqwest, serde_json, serde_yaml, serde_jcs, regex
// ============================================================================

//! ## Overview
//! This crate is the reusable core of the conformance suites:
//! - [`schema`]: loads and validates OpenAPI documents and exposes operations
//!   by identifier.
//! - [`case`]: materialises concrete requests, synthesizing any field the
//!   caller did not supply.
//! - [`client`]: executes requests, validates responses against their
//!   declared contract, and audits every exchange.
//! - [`snapshot`]: compares response bodies against stored snapshots under
//!   type and exclusion masks.
//!
//! Credentials are wrapped in [`Secret`] and never appear in logs, errors, or
//! `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod case;
pub mod client;
pub mod schema;
pub mod secret;
pub mod settings;
pub mod snapshot;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::CallAuditEvent;
pub use audit::CallAuditSink;
pub use audit::CallOutcome;
pub use audit::FileAuditSink;
pub use audit::FixtureAuditEvent;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use case::Case;
pub use case::CaseError;
pub use case::CaseOverrides;
pub use case::make_case;
pub use client::ApiClient;
pub use client::ApiResponse;
pub use client::CallError;
pub use client::Conformance;
pub use client::KnownDeviation;
pub use client::UploadFile;
pub use client::UploadRequest;
pub use schema::Operation;
pub use schema::SchemaError;
pub use schema::SchemaHandle;
pub use schema::SchemaSet;
pub use secret::Secret;
pub use settings::HarnessSettings;
pub use settings::SettingsError;
pub use snapshot::JsonType;
pub use snapshot::Masks;
pub use snapshot::Snapshot;
pub use snapshot::SnapshotError;
pub use snapshot::SnapshotOutcome;
pub use snapshot::SnapshotStore;
