// crates/autoroute-core/src/core/result.rs
// ============================================================================
// Module: Autoroute Normalized Result
// Description: Uniform success and error outcomes returned by dispatch.
// Purpose: Let every server adapter translate outcomes without re-classifying.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Dispatch never raises errors to adapters. It returns a [`NormalizedResult`]
//! holding either a JSON payload with the descriptor status code or a
//! [`DispatchFailure`] with one of three error kinds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Error Kinds
// ============================================================================

/// Request-time error classification.
///
/// # Invariants
/// - Variants are stable for programmatic handling and wire labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Requested instance does not exist.
    NotFound,
    /// Missing or malformed parameter.
    ValidationError,
    /// Failure inside the invoked action or its collaborators.
    InternalError,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::ValidationError => 422,
            Self::InternalError => 500,
        }
    }

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::ValidationError => "ValidationError",
            Self::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Dispatch Failure
// ============================================================================

/// Error record produced by dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchFailure {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// HTTP status code.
    pub status_code: u16,
}

impl DispatchFailure {
    /// Creates a failure of the given kind with its default status code.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: kind.status_code(),
        }
    }

    /// Creates a `NotFound` failure.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a `ValidationError` failure.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Creates an `InternalError` failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    /// Returns the `{"error": {"type", "message"}}` wire body.
    #[must_use]
    pub fn to_body(&self) -> Value {
        json!({
            "error": {
                "type": self.kind.as_str(),
                "message": self.message,
            }
        })
    }
}

// ============================================================================
// SECTION: Normalized Result
// ============================================================================

/// Outcome of a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    /// Action completed; payload is returned with the descriptor status.
    Success {
        /// Descriptor status code.
        status_code: u16,
        /// JSON payload returned by the action.
        payload: Value,
    },
    /// Dispatch failed.
    Error(DispatchFailure),
}

impl NormalizedResult {
    /// Returns the HTTP status code for this outcome.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Success {
                status_code, ..
            } => *status_code,
            Self::Error(failure) => failure.status_code,
        }
    }

    /// Returns true for successful outcomes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the error kind for failed outcomes.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success {
                ..
            } => None,
            Self::Error(failure) => Some(failure.kind),
        }
    }

    /// Returns the JSON response body, or `None` when the status forbids one.
    #[must_use]
    pub fn response_body(&self) -> Option<Value> {
        match self {
            Self::Success {
                status_code, ..
            } if !status_allows_body(*status_code) => None,
            Self::Success {
                payload, ..
            } => Some(payload.clone()),
            Self::Error(failure) => Some(failure.to_body()),
        }
    }
}

/// Returns false for status codes that must not carry a response body.
#[must_use]
pub const fn status_allows_body(status_code: u16) -> bool {
    !matches!(status_code, 100 ..= 199 | 204 | 304)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
