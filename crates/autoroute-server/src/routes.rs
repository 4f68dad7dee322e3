// crates/autoroute-server/src/routes.rs
// ============================================================================
// Module: Route Table and Service
// Description: Discovered routes per mount plus the shared request pipeline.
// Purpose: Give every adapter one resolve/dispatch/audit path.
// Dependencies: autoroute-config, autoroute-core
// ============================================================================

//! ## Overview
//! [`RouteTable`] runs discovery once per mount, checks the combined route
//! list for conflicts, and prerenders the route manifests. [`RouteService`]
//! owns the table, the [`Dispatcher`], and the audit and metrics sinks; both
//! adapters funnel requests through it so status codes, error bodies, and
//! audit records are identical across backends.
//!
//! ## Invariants
//! - The table is immutable once built.
//! - When several templates match a path, the one with static segments
//!   earliest wins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use autoroute_config::ServerBackend;
use autoroute_core::DiscoveryError;
use autoroute_core::Dispatcher;
use autoroute_core::ErrorKind;
use autoroute_core::HttpMethod;
use autoroute_core::MountOptions;
use autoroute_core::RegisteredRoute;
use autoroute_core::ResourceCatalog;
use autoroute_core::RouteTemplate;
use autoroute_core::TemplateSegment;
use autoroute_core::TypeSelection;
use autoroute_core::check_route_conflicts;
use autoroute_core::discover;
use autoroute_core::normalize_prefix;

use crate::audit::DispatchAuditEvent;
use crate::audit::DispatchAuditEventParams;
use crate::audit::DispatchAuditSink;
use crate::audit::NoopAuditSink;
use crate::boundary::ResponseParts;
use crate::boundary::normalize_request;
use crate::manifest::manifest_path;
use crate::manifest::route_manifest;
use crate::telemetry::DispatchMetricEvent;
use crate::telemetry::DispatchMetrics;
use crate::telemetry::DispatchOutcome;
use crate::telemetry::NoopMetrics;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request body limit when none is configured.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Title used in rendered route manifests.
const MANIFEST_TITLE: &str = "Autoroute";

// ============================================================================
// SECTION: Route Table
// ============================================================================

/// One mount request: which types to expose under which prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    /// Types included in the mount.
    pub selection: TypeSelection,
    /// Prefix applied to every template.
    pub options: MountOptions,
}

impl MountSpec {
    /// Mounts every registered type at the root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            selection: TypeSelection::All,
            options: MountOptions::root(),
        }
    }
}

/// Routes discovered across all mounts.
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Routes in mount order, then discovery order.
    routes: Vec<RegisteredRoute>,
    /// Normalized mount prefixes in mount order.
    prefixes: Vec<String>,
    /// Serialized manifests keyed by request path.
    manifests: BTreeMap<String, Vec<u8>>,
}

impl RouteTable {
    /// Discovers routes for every mount and validates the combined table.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when any mount fails discovery, when routes
    /// from different mounts collide, or when a manifest path is taken.
    pub fn build(
        catalog: &ResourceCatalog,
        mounts: &[MountSpec],
        expose_route_manifest: bool,
    ) -> Result<Self, DiscoveryError> {
        let mut routes = Vec::new();
        let mut prefixes = Vec::new();
        let mut manifests = BTreeMap::new();
        for mount in mounts {
            let mounted = discover(catalog, &mount.selection, &mount.options)?;
            let prefix = normalize_prefix(&mount.options.prefix)?;
            if expose_route_manifest {
                let document = route_manifest(MANIFEST_TITLE, &mounted);
                let encoded = serde_json::to_vec(&document).unwrap_or_default();
                manifests.insert(manifest_path(&prefix), encoded);
            }
            prefixes.push(prefix);
            routes.extend(mounted);
        }
        check_route_conflicts(&routes)?;
        for path in manifests.keys() {
            if let Some(route) = routes.iter().find(|route| &route.url_template == path) {
                return Err(DiscoveryError::RouteConflict {
                    http_method: route.http_method(),
                    path: path.clone(),
                    first: "route manifest".to_string(),
                    second: route.descriptor.label(),
                });
            }
        }
        Ok(Self {
            routes,
            prefixes,
            manifests,
        })
    }

    /// Returns every route.
    #[must_use]
    pub fn routes(&self) -> &[RegisteredRoute] {
        &self.routes
    }

    /// Returns the route at `index`.
    #[must_use]
    pub fn route(&self, index: usize) -> Option<&RegisteredRoute> {
        self.routes.get(index)
    }

    /// Returns the normalized mount prefixes.
    #[must_use]
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns the manifest request paths.
    pub fn manifest_paths(&self) -> impl Iterator<Item = &str> {
        self.manifests.keys().map(String::as_str)
    }

    /// Returns the serialized manifest served at `path`.
    #[must_use]
    pub fn manifest(&self, path: &str) -> Option<&[u8]> {
        self.manifests.get(strip_trailing_slash(path)).map(Vec::as_slice)
    }

    /// Finds the route matching a verb and path with its placeholder values.
    #[must_use]
    pub fn resolve(
        &self,
        http_method: HttpMethod,
        path: &str,
    ) -> Option<(usize, BTreeMap<String, String>)> {
        self.routes
            .iter()
            .enumerate()
            .filter(|(_, route)| route.http_method() == http_method)
            .filter_map(|(index, route)| route.match_path(path).map(|params| (index, params)))
            .max_by_key(|(index, _)| static_priority(&self.routes[*index].template))
    }
}

/// Static-segment flags in order; lexicographically larger is more specific.
fn static_priority(template: &RouteTemplate) -> Vec<bool> {
    template
        .segments()
        .iter()
        .map(|segment| matches!(segment, TemplateSegment::Static(_)))
        .collect()
}

/// Drops one trailing `/` from non-root paths.
fn strip_trailing_slash(path: &str) -> &str {
    if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path }
}

// ============================================================================
// SECTION: Route Service
// ============================================================================

/// Shared request pipeline used by every adapter.
pub struct RouteService {
    /// Discovered routes.
    table: RouteTable,
    /// Dispatch core.
    dispatcher: Dispatcher,
    /// Backend label for audit and metrics.
    backend: ServerBackend,
    /// Request body limit.
    max_body_bytes: usize,
    /// Audit sink.
    audit: Arc<dyn DispatchAuditSink>,
    /// Metrics sink.
    metrics: Arc<dyn DispatchMetrics>,
}

impl RouteService {
    /// Creates a service with no-op audit and metrics sinks.
    #[must_use]
    pub fn new(table: RouteTable, dispatcher: Dispatcher, backend: ServerBackend) -> Self {
        Self {
            table,
            dispatcher,
            backend,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            audit: Arc::new(NoopAuditSink),
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Sets the request body limit.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn DispatchAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Sets the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Sets the backend label.
    #[must_use]
    pub const fn with_backend(mut self, backend: ServerBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Returns the route table.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Returns the backend label.
    #[must_use]
    pub const fn backend(&self) -> ServerBackend {
        self.backend
    }

    /// Returns the request body limit.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> &dyn DispatchAuditSink {
        self.audit.as_ref()
    }

    /// Runs the full pipeline for a raw request: manifest, route, or 404.
    #[must_use]
    pub fn handle(
        &self,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: &[u8],
    ) -> ResponseParts {
        let http_method = HttpMethod::parse(method);
        if http_method == Some(HttpMethod::Get)
            && let Some(response) = self.handle_manifest(path)
        {
            return response;
        }
        match http_method.and_then(|verb| self.table.resolve(verb, path)) {
            Some((index, _)) if body.len() > self.max_body_bytes => {
                self.reject_oversized(Some(index), body.len())
            }
            Some((index, _)) => self.handle_route(index, path, query, body),
            None => self.handle_unmatched(method, path, body.len()),
        }
    }

    /// Dispatches a request already matched to route `index`.
    #[must_use]
    pub fn handle_route(
        &self,
        index: usize,
        path: &str,
        query: Option<&str>,
        body: &[u8],
    ) -> ResponseParts {
        let started = Instant::now();
        let Some(route) = self.table.route(index) else {
            return self.handle_unmatched("?", path, body.len());
        };
        let Some(path_params) = route.match_path(path) else {
            return self.handle_unmatched(route.http_method().as_str(), path, body.len());
        };
        let request = normalize_request(route.http_method(), path_params, query, body);
        let result = self.dispatcher.dispatch_route(route, &request);
        let response = ResponseParts::from_result(&result);
        let outcome = if result.is_success() {
            DispatchOutcome::Ok
        } else {
            DispatchOutcome::Error
        };
        self.observe(
            Observation {
                http_method: Some(route.http_method()),
                route: Some(route),
                outcome,
                error_kind: result.error_kind(),
                request_bytes: body.len(),
            },
            &response,
            started,
        );
        response
    }

    /// Serves the manifest for `path` when one is exposed there.
    #[must_use]
    pub fn handle_manifest(&self, path: &str) -> Option<ResponseParts> {
        self.table.manifest(path).map(|document| ResponseParts {
            status_code: 200,
            body: Some(document.to_vec()),
        })
    }

    /// Builds and records the 404 response for an unmatched request.
    #[must_use]
    pub fn handle_unmatched(
        &self,
        method: &str,
        path: &str,
        request_bytes: usize,
    ) -> ResponseParts {
        let started = Instant::now();
        let response = ResponseParts::unmatched(method, path);
        self.observe(
            Observation {
                http_method: HttpMethod::parse(method),
                route: None,
                outcome: DispatchOutcome::Unmatched,
                error_kind: Some(ErrorKind::NotFound),
                request_bytes,
            },
            &response,
            started,
        );
        response
    }

    /// Builds the 413 response for an oversized body on a raw request.
    #[must_use]
    pub fn handle_oversized(
        &self,
        method: &str,
        path: &str,
        request_bytes: usize,
    ) -> ResponseParts {
        let index = HttpMethod::parse(method)
            .and_then(|verb| self.table.resolve(verb, path))
            .map(|(index, _)| index);
        self.reject_oversized(index, request_bytes)
    }

    /// Builds and records the 413 response for an oversized body.
    #[must_use]
    pub fn reject_oversized(&self, index: Option<usize>, request_bytes: usize) -> ResponseParts {
        let started = Instant::now();
        let response = ResponseParts::payload_too_large(self.max_body_bytes);
        let route = index.and_then(|index| self.table.route(index));
        self.observe(
            Observation {
                http_method: route.map(RegisteredRoute::http_method),
                route,
                outcome: DispatchOutcome::Rejected,
                error_kind: None,
                request_bytes,
            },
            &response,
            started,
        );
        response
    }

    /// Emits the audit event and metrics for one response.
    fn observe(&self, observation: Observation<'_>, response: &ResponseParts, started: Instant) {
        let template = observation.route.map(|route| route.url_template.clone());
        self.audit.record(&DispatchAuditEvent::new(DispatchAuditEventParams {
            backend: self.backend,
            http_method: observation.http_method,
            route: template.clone(),
            owner: observation.route.map(|route| route.owner_type.as_str().to_string()),
            action: observation.route.map(|route| route.descriptor.method.as_str().to_string()),
            status_code: response.status_code,
            outcome: observation.outcome,
            error_kind: observation.error_kind,
            request_bytes: observation.request_bytes,
            response_bytes: response.body_len(),
        }));
        let event = DispatchMetricEvent {
            backend: self.backend,
            http_method: observation.http_method,
            route: template,
            outcome: observation.outcome,
            error_kind: observation.error_kind,
            status_code: response.status_code,
            request_bytes: observation.request_bytes,
            response_bytes: response.body_len(),
        };
        self.metrics.record_request(event.clone());
        self.metrics.record_latency(event, started.elapsed());
    }
}

/// Per-request fields recorded by [`RouteService::observe`].
struct Observation<'a> {
    /// Request verb when supported.
    http_method: Option<HttpMethod>,
    /// Matched route.
    route: Option<&'a RegisteredRoute>,
    /// Outcome label.
    outcome: DispatchOutcome,
    /// Error kind when dispatch failed.
    error_kind: Option<ErrorKind>,
    /// Request body size.
    request_bytes: usize,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
