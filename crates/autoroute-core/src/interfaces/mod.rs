// crates/autoroute-core/src/interfaces/mod.rs
// ============================================================================
// Module: Autoroute Interfaces
// Description: Collaborator contracts for instance storage and record decoding.
// Purpose: Define the seams between dispatch and application-owned systems.
// Dependencies: jsonschema, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Autoroute does not own persistence or record validation. Applications plug
//! in a [`ResourceStore`] per resource type and optional [`RecordDecoder`]s for
//! structured parameters. Action handlers report failures as [`ActionError`].
//!
//! ## Invariants
//! - Stores are shared across concurrent dispatches and must be `Send + Sync`.
//! - No locking or version checks are applied around load, mutate, and save.
//!   Concurrent mutations of one instance resolve as last write wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Resource Store
// ============================================================================

/// Instance store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store backend reported an error.
    #[error("store error: {0}")]
    Store(String),
}

/// Application-owned persistence for one resource type.
///
/// # Invariants
/// - `load` returns `Ok(None)` for unknown identifiers.
/// - `save` replaces any existing instance for the identifier (last write
///   wins).
pub trait ResourceStore<R>: Send + Sync {
    /// Loads an instance by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load(&self, id: &str) -> Result<Option<R>, StoreError>;

    /// Saves an instance under the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn save(&self, id: &str, instance: &R) -> Result<(), StoreError>;

    /// Lists all stored instances ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn list(&self) -> Result<Vec<(String, R)>, StoreError>;
}

// ============================================================================
// SECTION: Action Errors
// ============================================================================

/// Failure reported by an action handler.
///
/// Dispatch surfaces these as `InternalError` results carrying the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ActionError {
    /// Human-readable failure message.
    message: String,
}

impl ActionError {
    /// Creates an action error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<StoreError> for ActionError {
    fn from(err: StoreError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("serialization failed: {err}"))
    }
}

// ============================================================================
// SECTION: Record Decoding
// ============================================================================

/// Record decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordDecodeError {
    /// Record did not satisfy the decoder's contract.
    #[error("{0}")]
    Invalid(String),
}

/// Validates or transforms structured record parameters.
pub trait RecordDecoder: Send + Sync {
    /// Decodes a JSON object into the record representation passed to actions.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDecodeError`] when the value is not a valid record.
    fn decode(&self, value: Value) -> Result<Value, RecordDecodeError>;
}

/// Record decoder validating values against a JSON Schema (draft 2020-12).
pub struct SchemaRecordDecoder {
    /// Compiled schema validator.
    validator: Validator,
}

impl SchemaRecordDecoder {
    /// Compiles a decoder from a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`RecordDecodeError`] when the schema does not compile.
    pub fn new(schema: &Value) -> Result<Self, RecordDecodeError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|err| RecordDecodeError::Invalid(format!("invalid schema: {err}")))?;
        Ok(Self {
            validator,
        })
    }
}

impl RecordDecoder for SchemaRecordDecoder {
    fn decode(&self, value: Value) -> Result<Value, RecordDecodeError> {
        let messages: Vec<String> =
            self.validator.iter_errors(&value).map(|err| err.to_string()).collect();
        if messages.is_empty() {
            Ok(value)
        } else {
            Err(RecordDecodeError::Invalid(messages.join("; ")))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use serde_json::json;

    use super::RecordDecoder;
    use super::SchemaRecordDecoder;

    #[test]
    fn schema_decoder_accepts_valid_records() {
        let decoder = SchemaRecordDecoder::new(&json!({
            "type": "object",
            "required": ["x"],
            "properties": {"x": {"type": "integer"}}
        }))
        .unwrap();
        let decoded = decoder.decode(json!({"x": 3})).unwrap();
        assert_eq!(decoded, json!({"x": 3}));
    }

    #[test]
    fn schema_decoder_rejects_invalid_records() {
        let decoder = SchemaRecordDecoder::new(&json!({
            "type": "object",
            "required": ["x"],
            "properties": {"x": {"type": "integer"}}
        }))
        .unwrap();
        assert!(decoder.decode(json!({"x": "three"})).is_err());
        assert!(decoder.decode(json!({})).is_err());
    }
}
