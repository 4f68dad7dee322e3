// crates/autoroute-server/src/boundary.rs
// ============================================================================
// Module: HTTP Boundary
// Description: Request normalization and response translation for adapters.
// Purpose: Keep framework types out of the dispatch core.
// Dependencies: autoroute-core, serde_json, url
// ============================================================================

//! ## Overview
//! Adapters hand raw request pieces (matched path parameters, query string,
//! body bytes) to this module and receive a [`NormalizedRequest`]. Dispatch
//! results come back as [`ResponseParts`], a status code plus optional JSON
//! bytes. Coercion and error classification stay in `autoroute-core`.
//!
//! ## Invariants
//! - Absent, malformed, or non-object bodies become an empty body map.
//! - Bodies are only read for POST, PUT, and PATCH.
//! - 204 responses carry no body.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use autoroute_core::DispatchFailure;
use autoroute_core::HttpMethod;
use autoroute_core::NormalizedRequest;
use autoroute_core::NormalizedResult;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type for every JSON response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status code for bodies over `server.max_body_bytes`.
pub const PAYLOAD_TOO_LARGE_STATUS: u16 = 413;

// ============================================================================
// SECTION: Request Normalization
// ============================================================================

/// Parses a raw query string into ordered multi-valued parameters.
#[must_use]
pub fn parse_query(query: Option<&str>) -> BTreeMap<String, Vec<String>> {
    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.entry(key.into_owned()).or_default().push(value.into_owned());
        }
    }
    params
}

/// Parses a JSON object body; anything else yields an empty map.
#[must_use]
pub fn parse_body(http_method: HttpMethod, body: &[u8]) -> Map<String, Value> {
    if !http_method.allows_body() || body.iter().all(u8::is_ascii_whitespace) {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Builds the normalized request handed to the dispatcher.
#[must_use]
pub fn normalize_request(
    http_method: HttpMethod,
    path_params: BTreeMap<String, String>,
    query: Option<&str>,
    body: &[u8],
) -> NormalizedRequest {
    NormalizedRequest {
        path_params,
        query_params: parse_query(query),
        body_params: parse_body(http_method, body),
    }
}

// ============================================================================
// SECTION: Response Translation
// ============================================================================

/// Framework-neutral HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    /// HTTP status code.
    pub status_code: u16,
    /// Serialized JSON body; `None` when the status forbids a body.
    pub body: Option<Vec<u8>>,
}

impl ResponseParts {
    /// Translates a dispatch result.
    #[must_use]
    pub fn from_result(result: &NormalizedResult) -> Self {
        match result.response_body() {
            None => Self {
                status_code: result.status_code(),
                body: None,
            },
            Some(body) => match serde_json::to_vec(&body) {
                Ok(bytes) => Self {
                    status_code: result.status_code(),
                    body: Some(bytes),
                },
                Err(err) => Self::from_failure(&DispatchFailure::internal(format!(
                    "response serialization failed: {err}"
                ))),
            },
        }
    }

    /// Translates a failure into the standard error body.
    #[must_use]
    pub fn from_failure(failure: &DispatchFailure) -> Self {
        Self::json(failure.status_code, &failure.to_body())
    }

    /// Builds the 404 response for requests no route matches.
    #[must_use]
    pub fn unmatched(method: &str, path: &str) -> Self {
        Self::from_failure(&DispatchFailure::not_found(format!("no route for {method} {path}")))
    }

    /// Builds the 413 response for oversized bodies.
    #[must_use]
    pub fn payload_too_large(limit: usize) -> Self {
        Self::json(
            PAYLOAD_TOO_LARGE_STATUS,
            &json!({
                "error": {
                    "type": "PayloadTooLarge",
                    "message": format!("request body exceeds {limit} bytes"),
                }
            }),
        )
    }

    /// Serializes a JSON value with the given status.
    #[must_use]
    pub fn json(status_code: u16, value: &Value) -> Self {
        Self {
            status_code,
            body: Some(serde_json::to_vec(value).unwrap_or_default()),
        }
    }

    /// Returns the body length in bytes.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
