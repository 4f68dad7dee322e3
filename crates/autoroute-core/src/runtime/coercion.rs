// crates/autoroute-core/src/runtime/coercion.rs
// ============================================================================
// Module: Autoroute Parameter Coercion
// Description: Extracts declared parameters from a normalized request.
// Purpose: Turn untyped path, query, and body values into typed JSON arguments.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every declared [`ParameterSpec`] is resolved from the first source that
//! carries it: path placeholders (never `id`), then the query string, then
//! the JSON body. Raw values are coerced according to the declared
//! [`SemanticType`] and collected into [`Arguments`] for the action handler.
//!
//! ## Invariants
//! - A missing required parameter is reported before any coercion of later
//!   parameters and before invocation.
//! - Repeated query values for scalar parameters resolve to the last value.
//! - Floats are always finite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::core::ID_PARAM;
use crate::core::NormalizedRequest;
use crate::core::ParameterSpec;
use crate::core::SemanticType;
use crate::interfaces::ActionError;
use crate::interfaces::RecordDecoder;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registered record decoders keyed by record name.
pub type RecordDecoders = BTreeMap<String, Arc<dyn RecordDecoder>>;

/// Parameter extraction failures, surfaced as `ValidationError` results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// Required parameter is absent from every source.
    #[error("missing required parameter '{name}'")]
    Missing {
        /// Parameter name.
        name: String,
    },
    /// Parameter value could not be coerced to the declared type.
    #[error("parameter '{name}' must be {expected}: {reason}")]
    Invalid {
        /// Parameter name.
        name: String,
        /// Declared type label.
        expected: String,
        /// Coercion failure detail.
        reason: String,
    },
}

/// Coerced arguments passed to an action handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    /// Parameter name to coerced JSON value.
    values: BTreeMap<String, Value>,
}

impl Arguments {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an argument set from pre-coerced values.
    #[must_use]
    pub const fn from_values(values: BTreeMap<String, Value>) -> Self {
        Self {
            values,
        }
    }

    /// Returns the raw coerced value for a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no arguments are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a string argument.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the argument is absent or not a string.
    pub fn string(&self, name: &str) -> Result<&str, ActionError> {
        self.require(name)?.as_str().ok_or_else(|| wrong_type(name, "string"))
    }

    /// Returns an integer argument.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the argument is absent or not an integer.
    pub fn integer(&self, name: &str) -> Result<i64, ActionError> {
        self.require(name)?.as_i64().ok_or_else(|| wrong_type(name, "integer"))
    }

    /// Returns a float argument.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the argument is absent or not a number.
    pub fn float(&self, name: &str) -> Result<f64, ActionError> {
        self.require(name)?.as_f64().ok_or_else(|| wrong_type(name, "float"))
    }

    /// Returns a boolean argument.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the argument is absent or not a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, ActionError> {
        self.require(name)?.as_bool().ok_or_else(|| wrong_type(name, "boolean"))
    }

    /// Returns a list argument.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the argument is absent or not a list.
    pub fn list(&self, name: &str) -> Result<&[Value], ActionError> {
        self.require(name)?.as_array().map(Vec::as_slice).ok_or_else(|| wrong_type(name, "list"))
    }

    /// Deserializes an argument into a typed value.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the argument is absent or does not
    /// deserialize into `T`.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T, ActionError> {
        let value = self.require(name)?.clone();
        serde_json::from_value(value)
            .map_err(|err| ActionError::new(format!("argument '{name}' is invalid: {err}")))
    }

    /// Returns the value or a missing-argument error.
    fn require(&self, name: &str) -> Result<&Value, ActionError> {
        self.values.get(name).ok_or_else(|| ActionError::new(format!("argument '{name}' missing")))
    }
}

/// Builds a wrong-type accessor error.
fn wrong_type(name: &str, expected: &str) -> ActionError {
    ActionError::new(format!("argument '{name}' is not a {expected}"))
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Raw value located for a parameter.
enum RawSource<'a> {
    /// Text values from the path or query string, in request order.
    Text(Vec<&'a str>),
    /// Decoded JSON body value.
    Json(&'a Value),
}

/// Extracts and coerces every declared parameter from the request.
///
/// # Errors
///
/// Returns [`CoercionError`] for the first missing or malformed parameter.
pub fn extract_arguments(
    parameters: &[ParameterSpec],
    request: &NormalizedRequest,
    decoders: &RecordDecoders,
) -> Result<Arguments, CoercionError> {
    let mut values = BTreeMap::new();
    for spec in parameters {
        let value = match locate(spec, request) {
            Some(RawSource::Json(Value::Null)) | None => fallback(spec)?,
            Some(RawSource::Text(raw)) => coerce_text(&raw, &spec.semantic_type, decoders),
            Some(RawSource::Json(raw)) => coerce_json(raw, &spec.semantic_type, decoders),
        }
        .map_err(|reason| CoercionError::Invalid {
            name: spec.name.clone(),
            expected: spec.semantic_type.label(),
            reason,
        })?;
        values.insert(spec.name.clone(), value);
    }
    Ok(Arguments::from_values(values))
}

/// Finds the first source carrying the parameter.
fn locate<'a>(spec: &ParameterSpec, request: &'a NormalizedRequest) -> Option<RawSource<'a>> {
    if spec.name != ID_PARAM
        && let Some(value) = request.path_params.get(&spec.name)
    {
        return Some(RawSource::Text(vec![value.as_str()]));
    }
    if let Some(values) = request.query_params.get(&spec.name)
        && !values.is_empty()
    {
        return Some(RawSource::Text(values.iter().map(String::as_str).collect()));
    }
    request.body_params.get(&spec.name).map(RawSource::Json)
}

/// Resolves an absent (or JSON null) parameter to its default.
fn fallback(spec: &ParameterSpec) -> Result<Result<Value, String>, CoercionError> {
    if spec.required {
        return Err(CoercionError::Missing {
            name: spec.name.clone(),
        });
    }
    Ok(Ok(spec.default_value.clone().unwrap_or(Value::Null)))
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Coerces text values from the path or query string.
fn coerce_text(
    raw: &[&str],
    semantic_type: &SemanticType,
    decoders: &RecordDecoders,
) -> Result<Value, String> {
    match semantic_type {
        SemanticType::List {
            items,
        } if raw.len() > 1 => raw
            .iter()
            .enumerate()
            .map(|(index, value)| {
                coerce_str(value, items, decoders).map_err(|err| format!("element {index}: {err}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => {
            let last = raw.last().copied().unwrap_or_default();
            coerce_str(last, semantic_type, decoders)
        }
    }
}

/// Coerces a single text value.
fn coerce_str(
    raw: &str,
    semantic_type: &SemanticType,
    decoders: &RecordDecoders,
) -> Result<Value, String> {
    match semantic_type {
        SemanticType::String => Ok(Value::String(raw.to_string())),
        SemanticType::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{raw}' is not an integer")),
        SemanticType::Float => {
            let parsed =
                raw.trim().parse::<f64>().map_err(|_| format!("'{raw}' is not a number"))?;
            finite_number(parsed)
        }
        SemanticType::Boolean => {
            parse_bool(raw).map(Value::Bool).ok_or_else(|| format!("'{raw}' is not a boolean"))
        }
        SemanticType::List {
            items,
        } => {
            let trimmed = raw.trim();
            if trimmed.starts_with('[') {
                let parsed: Value = serde_json::from_str(trimmed)
                    .map_err(|err| format!("invalid JSON list: {err}"))?;
                return coerce_json(&parsed, semantic_type, decoders);
            }
            if trimmed.is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            trimmed
                .split(',')
                .enumerate()
                .map(|(index, part)| {
                    coerce_str(part.trim(), items, decoders)
                        .map_err(|err| format!("element {index}: {err}"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        SemanticType::Record {
            name,
        } => {
            let parsed: Value = serde_json::from_str(raw.trim())
                .map_err(|err| format!("invalid JSON object: {err}"))?;
            if !parsed.is_object() {
                return Err("expected a JSON object".to_string());
            }
            decode_record(name, parsed, decoders)
        }
    }
}

/// Coerces a decoded JSON body value.
fn coerce_json(
    raw: &Value,
    semantic_type: &SemanticType,
    decoders: &RecordDecoders,
) -> Result<Value, String> {
    if let Value::String(text) = raw
        && !matches!(semantic_type, SemanticType::String)
    {
        return coerce_str(text, semantic_type, decoders);
    }
    match (semantic_type, raw) {
        (SemanticType::String, Value::String(_)) => Ok(raw.clone()),
        (SemanticType::String, Value::Number(number)) => Ok(Value::String(number.to_string())),
        (SemanticType::String, Value::Bool(flag)) => Ok(Value::String(flag.to_string())),
        (SemanticType::Integer, Value::Number(number)) => number
            .as_i64()
            .map(Value::from)
            .ok_or_else(|| format!("{number} is not a 64-bit integer")),
        (SemanticType::Float, Value::Number(number)) => {
            number
                .as_f64()
                .ok_or_else(|| format!("{number} is not a number"))
                .and_then(finite_number)
        }
        (SemanticType::Boolean, Value::Bool(_)) => Ok(raw.clone()),
        (SemanticType::Boolean, Value::Number(number)) => match number.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(format!("{number} is not a boolean")),
        },
        (
            SemanticType::List {
                items,
            },
            Value::Array(elements),
        ) => elements
            .iter()
            .enumerate()
            .map(|(index, element)| {
                if element.is_null() {
                    return Err(format!("element {index}: null is not allowed"));
                }
                coerce_json(element, items, decoders)
                    .map_err(|err| format!("element {index}: {err}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        (
            SemanticType::Record {
                name,
            },
            Value::Object(_),
        ) => decode_record(name, raw.clone(), decoders),
        (_, other) => Err(format!("unexpected JSON {}", json_kind(other))),
    }
}

/// Runs the registered decoder for a record, if any.
fn decode_record(name: &str, value: Value, decoders: &RecordDecoders) -> Result<Value, String> {
    match decoders.get(name) {
        Some(decoder) => decoder.decode(value).map_err(|err| err.to_string()),
        None => Ok(value),
    }
}

/// Wraps a float as a JSON number, rejecting NaN and infinities.
fn finite_number(value: f64) -> Result<Value, String> {
    if !value.is_finite() {
        return Err("value must be finite".to_string());
    }
    Number::from_f64(value).map(Value::Number).ok_or_else(|| "value must be finite".to_string())
}

/// Parses the accepted boolean spellings.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Returns a label for a JSON value kind.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
