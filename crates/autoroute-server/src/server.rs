// crates/autoroute-server/src/server.rs
// ============================================================================
// Module: Route Server
// Description: Config-driven bootstrap for the HTTP adapters.
// Purpose: Validate config, discover routes, and serve on the chosen backend.
// Dependencies: autoroute-config, autoroute-core, axum, tiny_http, tokio
// ============================================================================

//! ## Overview
//! [`RouteServer::from_config`] validates configuration, applies route name
//! overrides to the catalog, runs discovery for every mount, and builds the
//! audit sink. Any configuration error aborts startup before a socket is
//! bound. [`RouteServer::serve`] then runs the configured backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use autoroute_config::AuditSinkKind;
use autoroute_config::AutorouteConfig;
use autoroute_config::ServerBackend;
use autoroute_core::Dispatcher;
use autoroute_core::RegisteredRoute;
use autoroute_core::ResourceCatalog;

use crate::audit::DispatchAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::ServerAuditEvent;
use crate::audit::StderrAuditSink;
use crate::axum_adapter;
use crate::routes::MountSpec;
use crate::routes::RouteService;
use crate::routes::RouteTable;
use crate::telemetry::DispatchMetrics;
use crate::tiny_http_adapter::TinyHttpServer;

// ============================================================================
// SECTION: Route Server
// ============================================================================

/// Configured HTTP server over a resource catalog.
pub struct RouteServer {
    /// Validated configuration.
    config: AutorouteConfig,
    /// Request pipeline shared with the adapters.
    service: RouteService,
}

impl RouteServer {
    /// Builds a server with a dispatcher that has no record decoders.
    ///
    /// # Errors
    ///
    /// Returns [`RouteServerError`] when configuration or discovery fails.
    pub fn from_config(
        config: AutorouteConfig,
        catalog: ResourceCatalog,
    ) -> Result<Self, RouteServerError> {
        Self::from_parts(config, catalog, Dispatcher::new())
    }

    /// Builds a server with a caller-provided dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`RouteServerError`] when configuration or discovery fails.
    pub fn from_parts(
        mut config: AutorouteConfig,
        mut catalog: ResourceCatalog,
        dispatcher: Dispatcher,
    ) -> Result<Self, RouteServerError> {
        config.validate().map_err(|err| RouteServerError::Config(err.to_string()))?;
        for (type_name, route_name) in config.route_overrides() {
            catalog
                .set_route_name(&type_name, route_name)
                .map_err(|err| RouteServerError::Config(err.to_string()))?;
        }
        let mounts: Vec<MountSpec> = config
            .effective_mounts()
            .iter()
            .map(|mount| MountSpec {
                selection: mount.selection(),
                options: mount.mount_options(),
            })
            .collect();
        let table = RouteTable::build(&catalog, &mounts, config.server.expose_route_manifest)
            .map_err(|err| RouteServerError::Config(err.to_string()))?;
        let audit = build_audit_sink(&config)?;
        audit.record_server(&ServerAuditEvent::routes_registered(
            config.server.backend,
            table.routes().len(),
            table.prefixes().to_vec(),
        ));
        let service = RouteService::new(table, dispatcher, config.server.backend)
            .with_max_body_bytes(config.server.max_body_bytes)
            .with_audit_sink(audit);
        Ok(Self {
            config,
            service,
        })
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetrics>) -> Self {
        self.service = self.service.with_metrics(metrics);
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn DispatchAuditSink>) -> Self {
        self.service = self.service.with_audit_sink(audit);
        self
    }

    /// Returns the validated configuration.
    #[must_use]
    pub const fn config(&self) -> &AutorouteConfig {
        &self.config
    }

    /// Returns the discovered routes across all mounts.
    #[must_use]
    pub fn routes(&self) -> &[RegisteredRoute] {
        self.service.table().routes()
    }

    /// Returns the request pipeline, consuming the server.
    #[must_use]
    pub fn into_service(self) -> Arc<RouteService> {
        Arc::new(self.service)
    }

    /// Serves requests on the configured backend and bind address.
    ///
    /// # Errors
    ///
    /// Returns [`RouteServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), RouteServerError> {
        let addr =
            self.config.bind_addr().map_err(|err| RouteServerError::Config(err.to_string()))?;
        let backend = self.config.server.backend;
        let workers = self.config.server.workers;
        let service = self.into_service();
        match backend {
            ServerBackend::Axum => {
                let listener = tokio::net::TcpListener::bind(addr)
                    .await
                    .map_err(|_| RouteServerError::Transport("http bind failed".to_string()))?;
                let local = listener.local_addr().unwrap_or(addr);
                announce(&service, local);
                axum_adapter::serve(service, listener).await
            }
            ServerBackend::TinyHttp => {
                let server = TinyHttpServer::bind(addr, Arc::clone(&service), workers)?;
                announce(&service, server.local_addr().unwrap_or(addr));
                tokio::task::spawn_blocking(move || server.run()).await.map_err(|_| {
                    RouteServerError::Transport("http worker pool failed".to_string())
                })?
            }
        }
    }
}

/// Records the `server_listening` audit event.
fn announce(service: &RouteService, addr: SocketAddr) {
    service.audit().record_server(&ServerAuditEvent::server_listening(
        service.backend(),
        addr.to_string(),
        service.table().routes().len(),
        service.table().prefixes().to_vec(),
    ));
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(
    config: &AutorouteConfig,
) -> Result<Arc<dyn DispatchAuditSink>, RouteServerError> {
    match config.audit.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
        AuditSinkKind::File => {
            let path = config.audit.path.as_deref().ok_or_else(|| {
                RouteServerError::Config("audit.sink=file requires audit.path".to_string())
            })?;
            let sink = FileAuditSink::new(Path::new(path.trim()))
                .map_err(|err| RouteServerError::Init(format!("audit log open failed: {err}")))?;
            Ok(Arc::new(sink))
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Route server errors.
#[derive(Debug, thiserror::Error)]
pub enum RouteServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
