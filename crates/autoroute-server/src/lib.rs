// crates/autoroute-server/src/lib.rs
// ============================================================================
// Module: Autoroute Server
// Description: HTTP adapters and bootstrap for Autoroute route tables.
// Purpose: Serve discovered resource actions over axum or tiny_http.
// Dependencies: autoroute-core, autoroute-config, axum, tiny_http, tokio
// ============================================================================

//! ## Overview
//! `autoroute-server` turns a [`autoroute_core::ResourceCatalog`] and an
//! [`autoroute_config::AutorouteConfig`] into a running HTTP server. Both
//! adapters are thin: they normalize requests, call the shared
//! [`RouteService`], and translate [`ResponseParts`] back to the wire.
//! Dispatch, coercion, and error classification live in `autoroute-core`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod axum_adapter;
pub mod boundary;
pub mod manifest;
pub mod routes;
pub mod server;
pub mod telemetry;
pub mod tiny_http_adapter;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::DispatchAuditEvent;
pub use audit::DispatchAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ServerAuditEvent;
pub use audit::StderrAuditSink;
pub use boundary::ResponseParts;
pub use manifest::route_manifest;
pub use routes::MountSpec;
pub use routes::RouteService;
pub use routes::RouteTable;
pub use server::RouteServer;
pub use server::RouteServerError;
pub use telemetry::DispatchMetricEvent;
pub use telemetry::DispatchMetrics;
pub use telemetry::DispatchOutcome;
pub use telemetry::NoopMetrics;
pub use tiny_http_adapter::TinyHttpHandle;
pub use tiny_http_adapter::TinyHttpServer;
