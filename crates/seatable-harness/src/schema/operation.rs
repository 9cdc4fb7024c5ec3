// crates/seatable-harness/src/schema/operation.rs
// ============================================================================
// Module: Operations
// Description: Immutable per-operation view of an API description.
// Purpose: Carry request and response contracts as self-contained schemas.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! An [`Operation`] is built once when its document loads and never changes
//! afterwards. Parameter, request body, and response schemas are already
//! inlined and normalised, so consumers never consult the document again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use super::document::OpenApiVersion;
use super::document::parameter_list;
use super::resolve;

// ============================================================================
// SECTION: Types
// ============================================================================

/// JSON Schema dialect used to validate an operation's schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDraft {
    /// Draft 4 (OpenAPI 3.0 documents).
    Draft4,
    /// Draft 2020-12 (OpenAPI 3.1 documents).
    Draft202012,
}

impl SchemaDraft {
    /// Maps the dialect onto the validator's draft selector.
    #[must_use]
    pub const fn as_jsonschema(self) -> jsonschema::Draft {
        match self {
            Self::Draft4 => jsonschema::Draft::Draft4,
            Self::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

impl From<OpenApiVersion> for SchemaDraft {
    fn from(version: OpenApiVersion) -> Self {
        match version {
            OpenApiVersion::V3_0 => Self::Draft4,
            OpenApiVersion::V3_1 => Self::Draft202012,
        }
    }
}

/// Location of a request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParameterLocation {
    /// Templated path segment.
    Path,
    /// URL query string.
    Query,
    /// Request header.
    Header,
    /// Cookie value.
    Cookie,
}

impl ParameterLocation {
    /// Parses the OpenAPI `in` field.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }
}

/// Declared request parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    pub location: ParameterLocation,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Normalised parameter schema.
    pub schema: Value,
}

/// Declared request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodySpec {
    /// Whether a body must be sent.
    pub required: bool,
    /// Preferred media type for the body.
    pub media_type: String,
    /// Normalised body schema.
    pub schema: Value,
}

/// Declared media type of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTypeSpec {
    /// Media type (possibly a wildcard such as `application/*`).
    pub media_type: String,
    /// Normalised body schema when declared.
    pub schema: Option<Value>,
}

/// Declared response for one status key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseSpec {
    /// Declared media types, empty when the response has no documented body.
    pub content: Vec<MediaTypeSpec>,
}

/// Response status key as written in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusKey {
    /// Exact status code.
    Exact(u16),
    /// Status class such as `2XX` (stores the leading digit).
    Range(u16),
    /// `default` response.
    Default,
}

impl StatusKey {
    /// Parses a `responses` key.
    fn parse(key: &str) -> Option<Self> {
        if key == "default" {
            return Some(Self::Default);
        }
        let upper = key.to_ascii_uppercase();
        if let Some(class) = upper.strip_suffix("XX")
            && class.len() == 1
        {
            return class.parse::<u16>().ok().map(Self::Range);
        }
        key.parse::<u16>().ok().map(Self::Exact)
    }

    /// Returns true when `status` falls under this key.
    #[must_use]
    pub const fn matches(self, status: u16) -> bool {
        match self {
            Self::Exact(code) => code == status,
            Self::Range(class) => status / 100 == class,
            Self::Default => true,
        }
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(code) => write!(f, "{code}"),
            Self::Range(class) => write!(f, "{class}XX"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A single API operation.
///
/// # Invariants
/// - Schemas contain no `$ref` and no `nullable` keyword.
/// - `path_template` placeholders all have a matching path parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// Stable operation identifier.
    pub id: String,
    /// HTTP method.
    pub method: Method,
    /// Path template relative to the base URL.
    pub path_template: String,
    /// Base URL the operation is bound to.
    pub base_url: Url,
    /// Declared parameters, path-level entries merged with operation entries.
    pub parameters: Vec<Parameter>,
    /// Declared request body.
    pub request_body: Option<RequestBodySpec>,
    /// Declared responses keyed by status key.
    pub responses: BTreeMap<StatusKey, ResponseSpec>,
    /// Dialect used to validate the schemas above.
    pub draft: SchemaDraft,
}

impl Operation {
    /// Returns the declared parameter with the given name and location.
    #[must_use]
    pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&Parameter> {
        self.parameters.iter().find(|param| param.name == name && param.location == location)
    }

    /// Returns the response declared for `status`, preferring exact codes over
    /// status classes over `default`.
    #[must_use]
    pub fn response_for(&self, status: u16) -> Option<(StatusKey, &ResponseSpec)> {
        let candidates =
            [StatusKey::Exact(status), StatusKey::Range(status / 100), StatusKey::Default];
        candidates.into_iter().find_map(|key| self.responses.get(&key).map(|spec| (key, spec)))
    }
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Raw inputs for building one operation.
pub(super) struct OperationSource<'a> {
    /// Document root used for reference resolution.
    pub root: &'a Value,
    /// Document version.
    pub version: OpenApiVersion,
    /// Base URL.
    pub base_url: &'a Url,
    /// Path template.
    pub template: &'a str,
    /// HTTP method (lowercase as in the document).
    pub method: &'a str,
    /// Path item object.
    pub item: &'a Value,
    /// Operation object.
    pub operation: &'a Value,
}

/// Builds an operation, returning `None` when it has no `operationId`.
pub(super) fn build_operation(source: &OperationSource<'_>) -> Option<Operation> {
    let id = source.operation.get("operationId").and_then(Value::as_str)?;
    let method = Method::from_bytes(source.method.to_ascii_uppercase().as_bytes()).ok()?;
    let schema = |value: &Value| {
        resolve::normalize(resolve::inline_refs(source.root, value), source.version)
    };

    let mut parameters: Vec<Parameter> = Vec::new();
    let shared = parameter_list(source.root, source.item.get("parameters"));
    let own = parameter_list(source.root, source.operation.get("parameters"));
    for raw in shared.into_iter().chain(own) {
        let Some(name) = raw.get("name").and_then(Value::as_str) else {
            continue;
        };
        let location = raw.get("in").and_then(Value::as_str).and_then(ParameterLocation::parse);
        let Some(location) = location else {
            continue;
        };
        let parameter = Parameter {
            name: name.to_string(),
            location,
            required: location == ParameterLocation::Path
                || raw.get("required").and_then(Value::as_bool).unwrap_or(false),
            schema: raw.get("schema").map_or_else(|| Value::Object(serde_json::Map::new()), &schema),
        };
        if let Some(existing) =
            parameters.iter_mut().find(|param| param.name == name && param.location == location)
        {
            *existing = parameter;
        } else {
            parameters.push(parameter);
        }
    }

    let request_body = source.operation.get("requestBody").map(|raw| {
        let raw = resolve::deref(source.root, raw);
        let (media_type, body_schema) = preferred_media_type(raw.get("content"));
        RequestBodySpec {
            required: raw.get("required").and_then(Value::as_bool).unwrap_or(false),
            media_type,
            schema: body_schema.map_or_else(|| Value::Object(serde_json::Map::new()), &schema),
        }
    });

    let mut responses = BTreeMap::new();
    if let Some(raw_responses) = source.operation.get("responses").and_then(Value::as_object) {
        for (key, raw) in raw_responses {
            let Some(status) = StatusKey::parse(key) else {
                continue;
            };
            let raw = resolve::deref(source.root, raw);
            let content = raw
                .get("content")
                .and_then(Value::as_object)
                .map(|media| {
                    media
                        .iter()
                        .map(|(media_type, entry)| MediaTypeSpec {
                            media_type: media_type.to_ascii_lowercase(),
                            schema: entry.get("schema").map(&schema),
                        })
                        .collect()
                })
                .unwrap_or_default();
            responses.insert(status, ResponseSpec {
                content,
            });
        }
    }

    Some(Operation {
        id: id.to_string(),
        method,
        path_template: source.template.to_string(),
        base_url: source.base_url.clone(),
        parameters,
        request_body,
        responses,
        draft: source.version.into(),
    })
}

/// Picks the request media type, preferring JSON.
fn preferred_media_type(content: Option<&Value>) -> (String, Option<&Value>) {
    let Some(content) = content.and_then(Value::as_object) else {
        return ("application/json".to_string(), None);
    };
    let json = content.iter().find(|(media_type, _)| is_json_media_type(media_type));
    json.or_else(|| content.iter().next()).map_or_else(
        || ("application/json".to_string(), None),
        |(media_type, entry)| (media_type.to_ascii_lowercase(), entry.get("schema")),
    )
}

/// Returns true for `application/json` and `+json` media types.
#[must_use]
pub(crate) fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
