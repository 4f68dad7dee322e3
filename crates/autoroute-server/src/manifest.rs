// crates/autoroute-server/src/manifest.rs
// ============================================================================
// Module: Route Manifest
// Description: OpenAPI 3.1 rendering of discovered routes.
// Purpose: Feed interactive API docs from registration metadata.
// Dependencies: autoroute-core, serde_json
// ============================================================================

//! ## Overview
//! [`route_manifest`] renders discovered routes as an OpenAPI 3.1 document.
//! Path placeholders become path parameters; declared parameters become query
//! parameters for GET and DELETE and a JSON object request body otherwise.
//! Output is deterministic for a given route list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use autoroute_core::ActionDescriptor;
use autoroute_core::ParameterSpec;
use autoroute_core::RegisteredRoute;
use autoroute_core::SemanticType;
use autoroute_core::status_allows_body;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// OpenAPI document version.
const OPENAPI_VERSION: &str = "3.1.0";
/// Path suffix serving the manifest under each mount.
pub const MANIFEST_SEGMENT: &str = "_routes";
/// Reference to the shared error schema.
const ERROR_SCHEMA_REF: &str = "#/components/schemas/Error";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Returns the manifest path for a normalized mount prefix.
#[must_use]
pub fn manifest_path(prefix: &str) -> String {
    format!("{prefix}/{MANIFEST_SEGMENT}")
}

/// Renders an OpenAPI 3.1 document for the given routes.
#[must_use]
pub fn route_manifest(title: &str, routes: &[RegisteredRoute]) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let entry = paths
            .entry(route.url_template.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(operations) = entry {
            operations.insert(
                route.http_method().as_str().to_ascii_lowercase(),
                operation(route),
            );
        }
    }
    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": title,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths,
        "components": {
            "schemas": {
                "Error": error_schema(),
            }
        }
    })
}

/// Renders one operation object.
fn operation(route: &RegisteredRoute) -> Value {
    let descriptor = route.descriptor.as_ref();
    let placeholders: BTreeSet<&str> = route.template.param_names().collect();
    let mut parameters: Vec<Value> = placeholders
        .iter()
        .map(|name| {
            let declared = descriptor.parameters.iter().find(|spec| spec.name == *name);
            json!({
                "name": name,
                "in": "path",
                "required": true,
                "schema": declared.map_or_else(|| json!({"type": "string"}), parameter_schema),
            })
        })
        .collect();
    let remaining: Vec<&ParameterSpec> = descriptor
        .parameters
        .iter()
        .filter(|spec| !placeholders.contains(spec.name.as_str()))
        .collect();

    let mut operation = Map::new();
    operation.insert("operationId".to_string(), Value::String(operation_id(route)));
    if let Some(summary) = &descriptor.docs.summary {
        operation.insert("summary".to_string(), Value::String(summary.clone()));
    }
    if let Some(description) = &descriptor.docs.description {
        operation.insert("description".to_string(), Value::String(description.clone()));
    }
    let tags = if descriptor.docs.tags.is_empty() {
        vec![route.owner_route_name.as_str().to_string()]
    } else {
        descriptor.docs.tags.clone()
    };
    operation.insert("tags".to_string(), json!(tags));

    if descriptor.http_method.allows_body() {
        if !remaining.is_empty() {
            operation.insert("requestBody".to_string(), request_body(&remaining));
        }
    } else {
        parameters.extend(remaining.iter().map(|spec| {
            json!({
                "name": spec.name,
                "in": "query",
                "required": spec.required,
                "schema": parameter_schema(spec),
            })
        }));
    }
    if !parameters.is_empty() {
        operation.insert("parameters".to_string(), Value::Array(parameters));
    }
    operation.insert("responses".to_string(), responses(descriptor, !placeholders.is_empty()));
    Value::Object(operation)
}

/// Builds a stable operation id from verb and template.
fn operation_id(route: &RegisteredRoute) -> String {
    let mut id = route.http_method().as_str().to_ascii_lowercase();
    for ch in route.url_template.chars() {
        if ch.is_ascii_alphanumeric() {
            id.push(ch);
        } else if !id.ends_with('_') {
            id.push('_');
        }
    }
    id.trim_end_matches('_').to_string()
}

/// Renders the JSON object request body for body parameters.
fn request_body(specs: &[&ParameterSpec]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for spec in specs {
        properties.insert(spec.name.clone(), parameter_schema(spec));
        if spec.required {
            required.push(Value::String(spec.name.clone()));
        }
    }
    json!({
        "required": !required.is_empty(),
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                }
            }
        }
    })
}

/// Renders the responses object.
fn responses(descriptor: &ActionDescriptor, has_placeholders: bool) -> Value {
    let mut responses = Map::new();
    let status = descriptor.status_code.to_string();
    if status_allows_body(descriptor.status_code) {
        let schema = descriptor.docs.response_shape.clone().unwrap_or_else(|| json!({}));
        responses.insert(
            status,
            json!({
                "description": "Action result",
                "content": {"application/json": {"schema": schema}},
            }),
        );
    } else {
        responses.insert(status, json!({"description": "No content"}));
    }
    if descriptor.is_instance_action || has_placeholders {
        responses.insert("404".to_string(), error_response("Instance not found"));
    }
    if !descriptor.parameters.is_empty() {
        responses.insert("422".to_string(), error_response("Invalid or missing parameter"));
    }
    responses.insert("500".to_string(), error_response("Action failed"));
    Value::Object(responses)
}

/// Renders a response referencing the shared error schema.
fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": ERROR_SCHEMA_REF}}},
    })
}

/// Shared `{"error": {"type", "message"}}` schema.
fn error_schema() -> Value {
    json!({
        "type": "object",
        "required": ["error"],
        "properties": {
            "error": {
                "type": "object",
                "required": ["type", "message"],
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["NotFound", "ValidationError", "InternalError"]
                    },
                    "message": {"type": "string"},
                }
            }
        }
    })
}

/// Renders the schema for a declared parameter, including its default.
fn parameter_schema(spec: &ParameterSpec) -> Value {
    let mut schema = semantic_schema(&spec.semantic_type);
    if let (Value::Object(map), Some(default)) = (&mut schema, &spec.default_value) {
        map.insert("default".to_string(), default.clone());
    }
    schema
}

/// Maps a semantic type to a JSON Schema fragment.
fn semantic_schema(semantic_type: &SemanticType) -> Value {
    match semantic_type {
        SemanticType::String => json!({"type": "string"}),
        SemanticType::Integer => json!({"type": "integer", "format": "int64"}),
        SemanticType::Float => json!({"type": "number", "format": "double"}),
        SemanticType::Boolean => json!({"type": "boolean"}),
        SemanticType::List {
            items,
        } => json!({"type": "array", "items": semantic_schema(items)}),
        SemanticType::Record {
            name,
        } => json!({"type": "object", "title": name}),
    }
}
