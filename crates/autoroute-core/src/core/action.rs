// crates/autoroute-core/src/core/action.rs
// ============================================================================
// Module: Autoroute Action Descriptors
// Description: Immutable metadata records describing HTTP-exposed actions.
// Purpose: Capture verb, path override, status, and parameter contracts.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ActionDescriptor`] is the metadata attached to one resource method at
//! registration time. Descriptors are immutable once registered and are shared
//! between every route generated from them.
//!
//! ## Invariants
//! - A parameter with a default value is never required.
//! - Documentation metadata is carried through and never interpreted by
//!   dispatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::MethodName;
use crate::core::identifiers::TypeName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default success status code for registered actions.
pub const DEFAULT_STATUS_CODE: u16 = 200;
/// Default success status code for `delete` convenience registrations.
pub const DELETE_STATUS_CODE: u16 = 204;

// ============================================================================
// SECTION: HTTP Method
// ============================================================================

/// HTTP verbs supported for action routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical uppercase verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Parses a verb (case-insensitive). Returns `None` for unsupported verbs.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns true when requests with this verb may carry a JSON body.
    #[must_use]
    pub const fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Parameter Contracts
// ============================================================================

/// Declared type of an action parameter, used to coerce raw request values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticType {
    /// UTF-8 string.
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Finite 64-bit float.
    Float,
    /// Boolean flag.
    Boolean,
    /// Homogeneous list of the inner type.
    List {
        /// Element type.
        items: Box<Self>,
    },
    /// Structured record decoded by a named [`crate::interfaces::RecordDecoder`].
    Record {
        /// Record type name used to look up a decoder.
        name: String,
    },
}

impl SemanticType {
    /// Builds a list type with the given element type.
    #[must_use]
    pub fn list(items: Self) -> Self {
        Self::List {
            items: Box::new(items),
        }
    }

    /// Builds a record type with the given decoder name.
    #[must_use]
    pub fn record(name: impl Into<String>) -> Self {
        Self::Record {
            name: name.into(),
        }
    }

    /// Returns a human-readable label used in validation messages.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Float => "float".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::List {
                items,
            } => format!("list of {}", items.label()),
            Self::Record {
                name,
            } => format!("{name} record"),
        }
    }
}

/// One declared parameter of an action.
///
/// # Invariants
/// - `required` is false exactly when `default_value` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name as it appears in path, query, or body.
    pub name: String,
    /// Declared semantic type.
    pub semantic_type: SemanticType,
    /// Whether the parameter must be supplied by the request.
    pub required: bool,
    /// Value used when an optional parameter is absent.
    pub default_value: Option<Value>,
}

impl ParameterSpec {
    /// Declares a required parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            required: true,
            default_value: None,
        }
    }

    /// Declares a default value, making the parameter optional.
    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.required = false;
        self.default_value = Some(value);
        self
    }
}

// ============================================================================
// SECTION: Documentation Metadata
// ============================================================================

/// Free-form documentation carried by a descriptor for route manifests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    /// One-line summary.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Grouping tags.
    pub tags: Vec<String>,
    /// Declared response shape (JSON Schema fragment).
    pub response_shape: Option<Value>,
}

// ============================================================================
// SECTION: Action Descriptor
// ============================================================================

/// Metadata attached to one resource method at registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Owning resource type.
    pub owner: TypeName,
    /// Declared method name.
    pub method: MethodName,
    /// HTTP verb.
    pub http_method: HttpMethod,
    /// Optional path override (see [`crate::core::path::build_path`]).
    pub path_override: Option<String>,
    /// Success status code.
    pub status_code: u16,
    /// True when the action runs against a loaded instance.
    pub is_instance_action: bool,
    /// Ordered parameter contracts.
    pub parameters: Vec<ParameterSpec>,
    /// Documentation metadata.
    pub docs: DocMetadata,
}

impl ActionDescriptor {
    /// Creates a descriptor with default status, no override, and no parameters.
    #[must_use]
    pub fn new(owner: TypeName, method: MethodName, http_method: HttpMethod) -> Self {
        let status_code = match http_method {
            HttpMethod::Delete => DELETE_STATUS_CODE,
            _ => DEFAULT_STATUS_CODE,
        };
        Self {
            owner,
            method,
            http_method,
            path_override: None,
            status_code,
            is_instance_action: false,
            parameters: Vec::new(),
            docs: DocMetadata::default(),
        }
    }

    /// Returns a stable `Type.method` label for diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.owner, self.method)
    }
}
