// crates/seatable-harness/src/schema/document.rs
// ============================================================================
// Module: API Description Documents
// Description: Parsing and validation of OpenAPI documents.
// Purpose: Turn a file on disk into a validated JSON document tree.
// Dependencies: serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Documents are read with a size limit, parsed as YAML (`.yaml`/`.yml`) or
//! JSON, and validated fail-closed. YAML mappings with numeric keys (status
//! codes) are normalised to string keys so the rest of the registry works on
//! a single JSON representation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use super::SchemaError;
use super::meta;
use super::resolve;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum document size in bytes.
const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// HTTP methods recognised as operations inside a path item.
pub(super) const OPERATION_METHODS: [&str; 8] =
    ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

// ============================================================================
// SECTION: Types
// ============================================================================

/// OpenAPI major/minor line of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiVersion {
    /// OpenAPI 3.0.x (JSON Schema draft 4 dialect with `nullable`).
    V3_0,
    /// OpenAPI 3.1.x (JSON Schema 2020-12).
    V3_1,
}

impl OpenApiVersion {
    /// Parses the `openapi` field.
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split('.');
        let major = parts.next()?;
        let minor = parts.next()?;
        if major != "3" || parts.next().is_some_and(str::is_empty) {
            return None;
        }
        match minor {
            "0" => Some(Self::V3_0),
            "1" => Some(Self::V3_1),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Reads and parses a document from disk.
///
/// # Errors
///
/// Returns [`SchemaError::Io`] when the file is missing or oversized and
/// [`SchemaError::Parse`] when it is not valid JSON or YAML.
pub(super) fn read_document(path: &Path) -> Result<Value, SchemaError> {
    let bytes = fs::read(path)
        .map_err(|err| SchemaError::Io(format!("{}: {err}", path.display())))?;
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(SchemaError::Io(format!("{}: document exceeds size limit", path.display())));
    }
    parse_document(path, &bytes)
}

/// Parses document bytes, choosing YAML or JSON by file extension.
pub(super) fn parse_document(path: &Path, content: &[u8]) -> Result<Value, SchemaError> {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let ext = ext.to_ascii_lowercase();
    if ext == "yaml" || ext == "yml" {
        let value: serde_yaml::Value = serde_yaml::from_slice(content)
            .map_err(|err| SchemaError::Parse(format!("{}: {err}", path.display())))?;
        return yaml_to_json(value)
            .map_err(|err| SchemaError::Parse(format!("{}: {err}", path.display())));
    }
    serde_json::from_slice(content)
        .map_err(|err| SchemaError::Parse(format!("{}: {err}", path.display())))
}

/// Converts a YAML tree into JSON, stringifying scalar mapping keys.
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, String> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(flag) => Ok(Value::Bool(flag)),
        serde_yaml::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(Value::Number(int.into()))
            } else if let Some(uint) = number.as_u64() {
                Ok(Value::Number(uint.into()))
            } else {
                number
                    .as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| "non-finite number".to_string())
            }
        }
        serde_yaml::Value::String(text) => Ok(Value::String(text)),
        serde_yaml::Value::Sequence(items) => {
            items.into_iter().map(yaml_to_json).collect::<Result<Vec<_>, _>>().map(Value::Array)
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(text) => text,
                    serde_yaml::Value::Number(number) => number.to_string(),
                    serde_yaml::Value::Bool(flag) => flag.to_string(),
                    _ => return Err("unsupported mapping key".to_string()),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates a parsed document and returns its OpenAPI version.
///
/// # Errors
///
/// Returns [`SchemaError::Invalid`] describing the first failing check.
pub(super) fn validate_document(label: &str, root: &Value) -> Result<OpenApiVersion, SchemaError> {
    let invalid = |message: String| SchemaError::Invalid {
        document: label.to_string(),
        message,
    };
    meta::check_structure(root).map_err(invalid)?;
    let version_text = root.get("openapi").and_then(Value::as_str).unwrap_or_default();
    let version = OpenApiVersion::parse(version_text)
        .ok_or_else(|| invalid(format!("unsupported openapi version '{version_text}'")))?;
    check_refs(root, root, "").map_err(invalid)?;
    check_operations(root).map_err(invalid)?;
    Ok(version)
}

/// Ensures every `$ref` is local and resolves inside the document.
fn check_refs(root: &Value, node: &Value, location: &str) -> Result<(), String> {
    match node {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                resolve::lookup_ref(root, reference)
                    .map_err(|err| format!("{err} at '{location}'"))?;
            }
            for (key, child) in map {
                check_refs(root, child, &format!("{location}/{}", escape_pointer(key)))?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                check_refs(root, child, &format!("{location}/{index}"))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Checks operation id uniqueness and path parameter declarations.
fn check_operations(root: &Value) -> Result<(), String> {
    let mut seen = BTreeSet::new();
    let Some(paths) = root.get("paths").and_then(Value::as_object) else {
        return Ok(());
    };
    for (template, item) in paths {
        let item = resolve::deref(root, item);
        let shared = parameter_list(root, item.get("parameters"));
        for method in OPERATION_METHODS {
            let Some(operation) = item.get(method) else {
                continue;
            };
            if let Some(id) = operation.get("operationId").and_then(Value::as_str)
                && !seen.insert(id.to_string())
            {
                return Err(format!("duplicate operationId '{id}'"));
            }
            let mut declared: BTreeSet<&str> = BTreeSet::new();
            for parameter in shared.iter().chain(&parameter_list(root, operation.get("parameters")))
            {
                if parameter.get("in").and_then(Value::as_str) == Some("path")
                    && let Some(name) = parameter.get("name").and_then(Value::as_str)
                {
                    declared.insert(name);
                }
            }
            for name in template_parameters(template) {
                if !declared.contains(name) {
                    return Err(format!(
                        "path parameter '{name}' of {} {template} is not declared",
                        method.to_ascii_uppercase()
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Resolves a `parameters` array into parameter objects.
pub(super) fn parameter_list<'a>(root: &'a Value, parameters: Option<&'a Value>) -> Vec<&'a Value> {
    parameters
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|item| resolve::deref(root, item)).collect())
        .unwrap_or_default()
}

/// Extracts `{name}` placeholders from a path template.
pub(super) fn template_parameters(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1 ..].find('}') else {
            break;
        };
        names.push(&rest[start + 1 .. start + 1 + len]);
        rest = &rest[start + len + 2 ..];
    }
    names
}

/// Escapes a key for use in a JSON pointer.
pub(super) fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
