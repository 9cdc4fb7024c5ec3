// crates/seatable-harness/src/schema/registry.rs
// ============================================================================
// Module: Schema Handles
// Description: Loaded documents bound to a base URL, and named sets of them.
// Purpose: Provide operation lookup by stable identifier.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! [`SchemaHandle`] owns the operations of one validated document.
//! [`SchemaSet`] groups several handles under logical names so a test binary
//! loads each document once and resolves operations by document and id.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::SchemaError;
use super::document;
use super::document::OPERATION_METHODS;
use super::document::OpenApiVersion;
use super::operation::Operation;
use super::operation::OperationSource;
use super::operation::build_operation;
use super::resolve;

// ============================================================================
// SECTION: Schema Handle
// ============================================================================

/// Validated API description bound to a base URL.
#[derive(Debug, Clone)]
pub struct SchemaHandle {
    /// Document label used in error messages.
    label: String,
    /// OpenAPI version of the document.
    version: OpenApiVersion,
    /// Base URL the operations are bound to.
    base_url: Url,
    /// Operations keyed by identifier.
    operations: BTreeMap<String, Arc<Operation>>,
}

/// Loads and validates the document at `path`, binding it to `base_url`.
///
/// # Errors
///
/// Returns [`SchemaError`] when the document is missing, unparsable, or fails
/// validation, or when `base_url` is not an absolute URL.
pub fn load(path: &Path, base_url: &str) -> Result<SchemaHandle, SchemaError> {
    SchemaHandle::load(path, base_url)
}

impl SchemaHandle {
    /// Loads and validates the document at `path`.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn load(path: &Path, base_url: &str) -> Result<Self, SchemaError> {
        let root = document::read_document(path)?;
        Self::from_value(&path.display().to_string(), &root, base_url)
    }

    /// Builds a handle from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] when the document fails validation or
    /// the base URL is invalid.
    pub fn from_value(label: &str, root: &Value, base_url: &str) -> Result<Self, SchemaError> {
        let base_url = parse_base_url(label, base_url)?;
        let version = document::validate_document(label, root)?;
        let mut operations = BTreeMap::new();
        if let Some(paths) = root.get("paths").and_then(Value::as_object) {
            for (template, item) in paths {
                let item = resolve::deref(root, item);
                for method in OPERATION_METHODS {
                    let Some(operation) = item.get(method) else {
                        continue;
                    };
                    let source = OperationSource {
                        root,
                        version,
                        base_url: &base_url,
                        template,
                        method,
                        item,
                        operation,
                    };
                    if let Some(built) = build_operation(&source) {
                        operations.insert(built.id.clone(), Arc::new(built));
                    }
                }
            }
        }
        Ok(Self {
            label: label.to_string(),
            version,
            base_url,
            operations,
        })
    }

    /// Looks up an operation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownOperation`] when no operation has `id`.
    pub fn get_operation(&self, id: &str) -> Result<Arc<Operation>, SchemaError> {
        self.operations.get(id).cloned().ok_or_else(|| SchemaError::UnknownOperation(id.to_string()))
    }

    /// Returns the operation identifiers in sorted order.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Returns the document label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the OpenAPI version of the document.
    #[must_use]
    pub const fn version(&self) -> OpenApiVersion {
        self.version
    }

    /// Returns the bound base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Parses the base URL, requiring an absolute http(s) URL.
fn parse_base_url(label: &str, base_url: &str) -> Result<Url, SchemaError> {
    let invalid = |message: String| SchemaError::Invalid {
        document: label.to_string(),
        message,
    };
    let url = Url::parse(base_url).map_err(|err| invalid(format!("invalid base url: {err}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported base url scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("base url cannot carry a path".to_string()));
    }
    Ok(url)
}

// ============================================================================
// SECTION: Schema Set
// ============================================================================

/// Named collection of schema handles sharing one base URL.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    /// Handles keyed by logical document name.
    documents: BTreeMap<String, SchemaHandle>,
}

impl SchemaSet {
    /// Loads `<dir>/<name>.yaml` for every name in `names`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] encountered; no partial set is
    /// returned.
    pub fn load_dir(dir: &Path, names: &[&str], base_url: &str) -> Result<Self, SchemaError> {
        let mut documents = BTreeMap::new();
        for name in names {
            let path = dir.join(format!("{name}.yaml"));
            documents.insert((*name).to_string(), SchemaHandle::load(&path, base_url)?);
        }
        Ok(Self {
            documents,
        })
    }

    /// Adds a handle under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, handle: SchemaHandle) {
        self.documents.insert(name.into(), handle);
    }

    /// Returns the handle registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownDocument`] when no handle has `name`.
    pub fn document(&self, name: &str) -> Result<&SchemaHandle, SchemaError> {
        self.documents.get(name).ok_or_else(|| SchemaError::UnknownDocument(name.to_string()))
    }

    /// Looks up operation `id` in document `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the document or operation is unknown.
    pub fn operation(&self, name: &str, id: &str) -> Result<Arc<Operation>, SchemaError> {
        self.document(name)?.get_operation(id)
    }
}
