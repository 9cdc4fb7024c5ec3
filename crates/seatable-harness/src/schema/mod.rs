// crates/seatable-harness/src/schema/mod.rs
// ============================================================================
// Module: Schema Registry
// Description: API description loading, validation, and operation lookup.
// Purpose: Expose immutable operations keyed by their stable identifier.
// Dependencies: jsonschema, serde_json, serde_yaml, url
// ============================================================================

//! ## Overview
//! The schema registry loads OpenAPI 3.0/3.1 documents from disk, binds each
//! to a base URL, and validates them before use. Validation is never skipped:
//! a structural meta-schema check is followed by semantic checks for unique
//! operation identifiers, resolvable local references, and declared path
//! parameters. Operations are normalised to plain JSON Schema so the case
//! synthesizer and response validator share one view of each contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Modules
// ============================================================================

mod document;
mod meta;
mod operation;
mod registry;
mod resolve;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::OpenApiVersion;
pub use operation::MediaTypeSpec;
pub use operation::Operation;
pub use operation::Parameter;
pub use operation::ParameterLocation;
pub use operation::RequestBodySpec;
pub use operation::ResponseSpec;
pub use operation::SchemaDraft;
pub use operation::StatusKey;
pub use registry::SchemaHandle;
pub use registry::SchemaSet;
pub use registry::load;

pub(crate) use operation::is_json_media_type;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema registry errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// I/O failure while reading a document.
    #[error("schema io error: {0}")]
    Io(String),
    /// Document could not be parsed as JSON or YAML.
    #[error("schema parse error: {0}")]
    Parse(String),
    /// Document failed structural or semantic validation.
    #[error("invalid schema document {document}: {message}")]
    Invalid {
        /// Document label (usually its path).
        document: String,
        /// Validation failure description.
        message: String,
    },
    /// No operation with the requested identifier exists.
    #[error("unknown operation id: {0}")]
    UnknownOperation(String),
    /// No document registered under the requested name.
    #[error("unknown schema document: {0}")]
    UnknownDocument(String),
}
