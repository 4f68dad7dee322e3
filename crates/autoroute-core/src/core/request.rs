// crates/autoroute-core/src/core/request.rs
// ============================================================================
// Module: Autoroute Normalized Request
// Description: Framework-independent request data consumed by dispatch.
// Purpose: Decouple the dispatch core from HTTP server request types.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Server adapters build a [`NormalizedRequest`] per incoming request from the
//! matched path placeholders, the query string, and the decoded JSON body.
//! The request is owned by a single dispatch call and dropped afterwards.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path placeholder carrying the instance identifier.
pub const ID_PARAM: &str = "id";

// ============================================================================
// SECTION: Normalized Request
// ============================================================================

/// Request data normalized by a server adapter.
///
/// # Invariants
/// - `body_params` is empty for verbs that carry no body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRequest {
    /// Path placeholder name to raw (decoded) segment value.
    pub path_params: BTreeMap<String, String>,
    /// Query key to raw values in request order.
    pub query_params: BTreeMap<String, Vec<String>>,
    /// Decoded JSON body object.
    pub body_params: Map<String, Value>,
}

impl NormalizedRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    /// Appends a query parameter value.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Replaces the body parameters.
    #[must_use]
    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body_params = body;
        self
    }

    /// Returns the instance identifier path parameter, if present.
    #[must_use]
    pub fn instance_id(&self) -> Option<&str> {
        self.path_params.get(ID_PARAM).map(String::as_str)
    }
}
