// crates/autoroute-core/src/runtime/discovery.rs
// ============================================================================
// Module: Autoroute Discovery Engine
// Description: Enumerates registered actions and builds validated routes.
// Purpose: Produce the immutable route set consumed by server adapters.
// Dependencies: crate::{core, runtime::registry}, thiserror
// ============================================================================

//! ## Overview
//! [`discover`] walks the selected resource types of a [`ResourceCatalog`],
//! builds the URL template of every registered action under a mount prefix,
//! and validates the resulting set before any server starts.
//!
//! ## Invariants
//! - `(http method, url template)` pairs are unique; placeholder names do not
//!   affect uniqueness (`/a/{id}/x` and `/a/{key}/x` collide).
//! - Discovery has no side effects; each call returns a fresh list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::ActionDescriptor;
use crate::core::HttpMethod;
use crate::core::ID_PARAM;
use crate::core::RouteError;
use crate::core::RouteName;
use crate::core::RouteTemplate;
use crate::core::TypeName;
use crate::core::build_path;
use crate::core::join_prefix;
use crate::core::normalize_prefix;
use crate::runtime::registry::ActionHandler;
use crate::runtime::registry::InstanceLookup;
use crate::runtime::registry::ResourceCatalog;
use crate::runtime::registry::ResourceEntry;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors detected during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Two actions resolve to the same verb and path.
    #[error("route conflict: {http_method} {path} is declared by {first} and {second}")]
    RouteConflict {
        /// Conflicting verb.
        http_method: HttpMethod,
        /// URL template of the second declaration.
        path: String,
        /// First declaring action (`Type.method`).
        first: String,
        /// Second declaring action (`Type.method`).
        second: String,
    },
    /// Method name registered twice on one type without distinct overrides.
    #[error("duplicate action {owner}.{method}: register it once or give each a distinct path")]
    DuplicateAction {
        /// Owning type name.
        owner: String,
        /// Method name.
        method: String,
    },
    /// Explicit selection names an unregistered type.
    #[error("unknown resource type '{name}'")]
    UnknownType {
        /// Type name.
        name: String,
    },
    /// Route path could not be built.
    #[error(transparent)]
    Route(#[from] RouteError),
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Resource types included in a discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSelection {
    /// Every type registered in the catalog.
    All,
    /// Exactly the listed types, in order.
    Explicit(Vec<TypeName>),
}

impl TypeSelection {
    /// Builds a selection from an auto-discover flag and an explicit list.
    #[must_use]
    pub fn from_flags(auto_discover: bool, types: &[TypeName]) -> Self {
        if auto_discover { Self::All } else { Self::Explicit(types.to_vec()) }
    }
}

/// Mount options applied to every discovered route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountOptions {
    /// URL prefix such as `/api/v1`; empty or `/` mounts at the root.
    pub prefix: String,
}

impl MountOptions {
    /// Creates mount options with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns mount options for the root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }
}

// ============================================================================
// SECTION: Registered Route
// ============================================================================

/// Concrete route produced by discovery.
///
/// # Invariants
/// - Immutable after discovery; routes from different mounts may share a
///   descriptor.
#[derive(Clone)]
pub struct RegisteredRoute {
    /// Owning type name.
    pub owner_type: TypeName,
    /// Effective route name of the owning type.
    pub owner_route_name: RouteName,
    /// URL template including the mount prefix.
    pub url_template: String,
    /// Parsed template used to match request paths.
    pub template: RouteTemplate,
    /// Action metadata.
    pub descriptor: Arc<ActionDescriptor>,
    /// Instance lookup of the owning type.
    pub lookup: Arc<dyn InstanceLookup>,
    /// Action handler.
    pub handler: Arc<dyn ActionHandler>,
}

impl RegisteredRoute {
    /// Returns the route verb.
    #[must_use]
    pub fn http_method(&self) -> HttpMethod {
        self.descriptor.http_method
    }

    /// Matches a request path, returning decoded placeholder values.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        self.template.match_path(path)
    }

    /// Renders the concrete URL for an instance identifier.
    ///
    /// Returns `None` when the template needs placeholders other than `id`.
    #[must_use]
    pub fn url_for(&self, id: &str) -> Option<String> {
        let mut params = BTreeMap::new();
        params.insert(ID_PARAM.to_string(), id.to_string());
        self.url_for_params(&params)
    }

    /// Renders the concrete URL from placeholder values.
    ///
    /// Returns `None` when a placeholder has no value.
    #[must_use]
    pub fn url_for_params(&self, params: &BTreeMap<String, String>) -> Option<String> {
        self.template.render(params)
    }
}

impl fmt::Debug for RegisteredRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRoute")
            .field("owner_type", &self.owner_type)
            .field("owner_route_name", &self.owner_route_name)
            .field("url_template", &self.url_template)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RegisteredRoute {
    fn eq(&self, other: &Self) -> bool {
        self.owner_type == other.owner_type
            && self.owner_route_name == other.owner_route_name
            && self.url_template == other.url_template
            && self.descriptor == other.descriptor
    }
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Builds and validates the routes of the selected types under a mount.
///
/// # Errors
///
/// Returns [`DiscoveryError`] for unknown types, unusable paths, duplicate
/// actions, and route conflicts.
pub fn discover(
    catalog: &ResourceCatalog,
    selection: &TypeSelection,
    mount: &MountOptions,
) -> Result<Vec<RegisteredRoute>, DiscoveryError> {
    let prefix = normalize_prefix(&mount.prefix)?;
    let entries = select_entries(catalog, selection)?;
    let mut routes = Vec::new();
    for entry in entries {
        check_duplicate_actions(entry)?;
        for action in entry.actions() {
            let path = build_path(entry.route_name(), &action.descriptor)?;
            let url_template = join_prefix(&prefix, &path);
            routes.push(RegisteredRoute {
                owner_type: entry.type_name().clone(),
                owner_route_name: entry.route_name().clone(),
                template: RouteTemplate::parse(&url_template),
                url_template,
                descriptor: Arc::clone(&action.descriptor),
                lookup: Arc::clone(entry.lookup()),
                handler: Arc::clone(&action.handler),
            });
        }
    }
    check_route_conflicts(&routes)?;
    Ok(routes)
}

/// Resolves the selection to catalog entries, skipping repeated names.
fn select_entries<'a>(
    catalog: &'a ResourceCatalog,
    selection: &TypeSelection,
) -> Result<Vec<&'a ResourceEntry>, DiscoveryError> {
    match selection {
        TypeSelection::All => Ok(catalog.entries().collect()),
        TypeSelection::Explicit(types) => {
            let mut seen = BTreeSet::new();
            let mut entries = Vec::new();
            for type_name in types {
                if !seen.insert(type_name) {
                    continue;
                }
                let entry = catalog.get(type_name).ok_or_else(|| DiscoveryError::UnknownType {
                    name: type_name.to_string(),
                })?;
                entries.push(entry);
            }
            Ok(entries)
        }
    }
}

/// Rejects method names registered twice without distinct path overrides.
fn check_duplicate_actions(entry: &ResourceEntry) -> Result<(), DiscoveryError> {
    let mut seen: BTreeMap<&str, Vec<Option<&str>>> = BTreeMap::new();
    for action in entry.actions() {
        let descriptor = &action.descriptor;
        let path_override = descriptor.path_override.as_deref();
        let overrides = seen.entry(descriptor.method.as_str()).or_default();
        if overrides.contains(&path_override) {
            return Err(DiscoveryError::DuplicateAction {
                owner: entry.type_name().to_string(),
                method: descriptor.method.to_string(),
            });
        }
        overrides.push(path_override);
    }
    Ok(())
}

/// Validates verb/path uniqueness across routes.
///
/// Server bootstraps call this on the union of all mounts.
///
/// # Errors
///
/// Returns [`DiscoveryError::RouteConflict`] when two routes share a verb and
/// a template shape.
pub fn check_route_conflicts(routes: &[RegisteredRoute]) -> Result<(), DiscoveryError> {
    let mut claimed: BTreeMap<(HttpMethod, String), &RegisteredRoute> = BTreeMap::new();
    for route in routes {
        let key = (route.http_method(), route.template.shape());
        if let Some(first) = claimed.get(&key) {
            return Err(DiscoveryError::RouteConflict {
                http_method: route.http_method(),
                path: route.url_template.clone(),
                first: first.descriptor.label(),
                second: route.descriptor.label(),
            });
        }
        claimed.insert(key, route);
    }
    Ok(())
}
