// crates/autoroute-core/src/core/path.rs
// ============================================================================
// Module: Autoroute Route Paths
// Description: Route path builder, mount prefixes, and URL template matching.
// Purpose: Compute concrete URL templates from action descriptors.
// Dependencies: percent-encoding, thiserror
// ============================================================================

//! ## Overview
//! [`build_path`] turns an owner route name and an [`ActionDescriptor`] into a
//! URL template such as `/counter/{id}/increment`. [`RouteTemplate`] parses a
//! template back into segments so adapters can extract placeholder values
//! from a concrete request path, and so client code can render URLs.
//!
//! ## Invariants
//! - Instance actions get exactly one `{id}` unless a multi-segment override
//!   replaces the tail of the path.
//! - Type-level actions never contain `{id}`.
//! - Empty overrides are configuration errors; they never fall back silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use thiserror::Error;

use crate::core::action::ActionDescriptor;
use crate::core::identifiers::RouteName;
use crate::core::request::ID_PARAM;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Template placeholder for the instance identifier.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Characters escaped when rendering a path segment.
const SEGMENT_ENCODE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Characters never allowed in a literal path segment.
const RESERVED_SEGMENT_CHARS: &[char] = &['{', '}', '?', '#', '\\', ' '];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors raised while building route paths.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// Path override is empty after normalization.
    #[error("{action}: path override must not be empty; omit it to use the method name")]
    EmptyPathOverride {
        /// Action label (`Type.method`).
        action: String,
    },
    /// Owner route name is not a single non-empty segment.
    #[error("invalid route name '{name}': must be a single non-empty path segment")]
    InvalidRouteName {
        /// Offending route name.
        name: String,
    },
    /// Path segment is empty or contains reserved characters.
    #[error("{action}: invalid path segment '{segment}'")]
    InvalidSegment {
        /// Action label (`Type.method`).
        action: String,
        /// Offending segment.
        segment: String,
    },
    /// Type-level action declared an `{id}` placeholder.
    #[error("{action}: type-level actions cannot declare an {{id}} placeholder")]
    IdPlaceholderNotAllowed {
        /// Action label (`Type.method`).
        action: String,
    },
    /// Placeholder name appears more than once in a template.
    #[error("{action}: placeholder '{name}' appears more than once")]
    DuplicatePlaceholder {
        /// Action label (`Type.method`).
        action: String,
        /// Repeated placeholder name.
        name: String,
    },
    /// Mount prefix contains an invalid segment.
    #[error("invalid mount prefix '{prefix}'")]
    InvalidPrefix {
        /// Offending prefix.
        prefix: String,
    },
}

// ============================================================================
// SECTION: Path Builder
// ============================================================================

/// Builds the URL template for an action under the given owner route name.
///
/// # Errors
///
/// Returns [`RouteError`] when the route name, method name, or override is
/// unusable as a URL path.
pub fn build_path(
    owner_route_name: &RouteName,
    descriptor: &ActionDescriptor,
) -> Result<String, RouteError> {
    let owner = owner_route_name.as_str();
    if !is_literal_segment(owner) {
        return Err(RouteError::InvalidRouteName {
            name: owner.to_string(),
        });
    }
    let instance = descriptor.is_instance_action;
    let Some(raw_override) = descriptor.path_override.as_deref() else {
        let segment = descriptor.method.as_str();
        if !is_literal_segment(segment) {
            return Err(invalid_segment(descriptor, segment));
        }
        return Ok(action_path(owner, instance, segment));
    };

    let normalized = normalize_override(raw_override);
    if normalized.is_empty() {
        return Err(RouteError::EmptyPathOverride {
            action: descriptor.label(),
        });
    }

    if !normalized.contains('/') {
        if !is_literal_segment(normalized) {
            return Err(invalid_segment(descriptor, normalized));
        }
        return Ok(action_path(owner, instance, normalized));
    }

    let mut placeholders = BTreeSet::new();
    for segment in normalized.split('/') {
        if let Some(name) = placeholder_name(segment) {
            if !is_placeholder_ident(name) {
                return Err(invalid_segment(descriptor, segment));
            }
            if name == ID_PARAM && !instance {
                return Err(RouteError::IdPlaceholderNotAllowed {
                    action: descriptor.label(),
                });
            }
            if !placeholders.insert(name) {
                return Err(RouteError::DuplicatePlaceholder {
                    action: descriptor.label(),
                    name: name.to_string(),
                });
            }
        } else if !is_literal_segment(segment) {
            return Err(invalid_segment(descriptor, segment));
        }
    }
    Ok(format!("/{owner}/{normalized}"))
}

/// Normalizes a mount prefix to `""` or `/a/b` form.
///
/// # Errors
///
/// Returns [`RouteError::InvalidPrefix`] when a prefix segment is empty or
/// contains reserved characters.
pub fn normalize_prefix(prefix: &str) -> Result<String, RouteError> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.split('/').any(|segment| !is_literal_segment(segment)) {
        return Err(RouteError::InvalidPrefix {
            prefix: prefix.to_string(),
        });
    }
    Ok(format!("/{trimmed}"))
}

/// Joins a normalized mount prefix and a built path.
#[must_use]
pub fn join_prefix(normalized_prefix: &str, path: &str) -> String {
    format!("{normalized_prefix}{path}")
}

/// Builds `/<owner>/{id}/<segment>` or `/<owner>/<segment>`.
fn action_path(owner: &str, instance: bool, segment: &str) -> String {
    if instance {
        format!("/{owner}/{ID_PLACEHOLDER}/{segment}")
    } else {
        format!("/{owner}/{segment}")
    }
}

/// Strips surrounding whitespace and separators from an override.
fn normalize_override(raw: &str) -> &str {
    raw.trim().trim_start_matches('/').trim_end_matches('/')
}

/// Returns the placeholder name when the segment is `{name}`.
fn placeholder_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'))
}

/// Returns true for identifiers usable as placeholder names.
fn is_placeholder_ident(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Returns true for non-empty literal segments without reserved characters.
fn is_literal_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains('/') && !segment.contains(RESERVED_SEGMENT_CHARS)
}

/// Builds an invalid segment error for the descriptor.
fn invalid_segment(descriptor: &ActionDescriptor, segment: &str) -> RouteError {
    RouteError::InvalidSegment {
        action: descriptor.label(),
        segment: segment.to_string(),
    }
}

// ============================================================================
// SECTION: Route Templates
// ============================================================================

/// One parsed segment of a URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// Literal segment matched exactly.
    Static(String),
    /// Placeholder capturing one segment.
    Param(String),
}

/// Parsed URL template used for matching and rendering concrete paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    /// Template text as built.
    raw: String,
    /// Parsed segments, excluding the leading empty segment.
    segments: Vec<TemplateSegment>,
}

impl RouteTemplate {
    /// Parses a template such as `/counter/{id}/increment`.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let segments = split_segments(template)
            .into_iter()
            .map(|segment| {
                placeholder_name(segment).map_or_else(
                    || TemplateSegment::Static(segment.to_string()),
                    |name| TemplateSegment::Param(name.to_string()),
                )
            })
            .collect();
        Self {
            raw: template.to_string(),
            segments,
        }
    }

    /// Returns the template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Returns placeholder names in path order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            TemplateSegment::Param(name) => Some(name.as_str()),
            TemplateSegment::Static(_) => None,
        })
    }

    /// Returns the number of literal segments (used to rank matches).
    #[must_use]
    pub fn static_segment_count(&self) -> usize {
        self.segments.iter().filter(|segment| matches!(segment, TemplateSegment::Static(_))).count()
    }

    /// Returns the template with placeholder names erased, e.g. `/counter/{}/add`.
    #[must_use]
    pub fn shape(&self) -> String {
        let mut shape = String::new();
        for segment in &self.segments {
            shape.push('/');
            match segment {
                TemplateSegment::Static(value) => shape.push_str(value),
                TemplateSegment::Param(_) => shape.push_str("{}"),
            }
        }
        if shape.is_empty() {
            shape.push('/');
        }
        shape
    }

    /// Matches a concrete request path, returning decoded placeholder values.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts = split_segments(path);
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            let decoded = percent_decode_str(part).decode_utf8().ok()?;
            match segment {
                TemplateSegment::Static(value) => {
                    if value.as_str() != decoded.as_ref() {
                        return None;
                    }
                }
                TemplateSegment::Param(name) => {
                    if decoded.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decoded.into_owned());
                }
            }
        }
        Some(params)
    }

    /// Renders a concrete path, percent-encoding placeholder values.
    ///
    /// Returns `None` when a placeholder has no value.
    #[must_use]
    pub fn render(&self, params: &BTreeMap<String, String>) -> Option<String> {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                TemplateSegment::Static(value) => path.push_str(value),
                TemplateSegment::Param(name) => {
                    let value = params.get(name)?;
                    path.push_str(&utf8_percent_encode(value, SEGMENT_ENCODE_SET).to_string());
                }
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Some(path)
    }
}

/// Splits a path into segments, ignoring leading and trailing separators.
fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    if trimmed.is_empty() { Vec::new() } else { trimmed.split('/').collect() }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
