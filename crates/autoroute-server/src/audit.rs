// crates/autoroute-server/src/audit.rs
// ============================================================================
// Module: Dispatch Audit Logging
// Description: Structured audit events for HTTP dispatch and startup.
// Purpose: Emit JSON-line audit logs without hard dependencies.
// Dependencies: autoroute-config, autoroute-core, serde
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for dispatch logging.
//! Events are serialized as JSON lines. Payloads and parameter values are
//! never recorded, only route templates, sizes, and outcomes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use autoroute_config::ServerBackend;
use autoroute_core::ErrorKind;
use autoroute_core::HttpMethod;
use serde::Serialize;

use crate::telemetry::DispatchOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Dispatch audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Backend serving the request.
    pub backend: ServerBackend,
    /// Request method when it is a supported verb.
    pub http_method: Option<HttpMethod>,
    /// Matched URL template.
    pub route: Option<String>,
    /// Owning type name.
    pub owner: Option<String>,
    /// Action method name.
    pub action: Option<String>,
    /// Response status code.
    pub status_code: u16,
    /// Request outcome.
    pub outcome: DispatchOutcome,
    /// Error kind when dispatch failed.
    pub error_kind: Option<ErrorKind>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Inputs required to construct a dispatch audit event.
pub struct DispatchAuditEventParams {
    /// Backend serving the request.
    pub backend: ServerBackend,
    /// Request method when it is a supported verb.
    pub http_method: Option<HttpMethod>,
    /// Matched URL template.
    pub route: Option<String>,
    /// Owning type name.
    pub owner: Option<String>,
    /// Action method name.
    pub action: Option<String>,
    /// Response status code.
    pub status_code: u16,
    /// Request outcome.
    pub outcome: DispatchOutcome,
    /// Error kind when dispatch failed.
    pub error_kind: Option<ErrorKind>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

/// Startup audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ServerAuditEvent {
    /// Event identifier (`routes_registered` or `server_listening`).
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Backend serving requests.
    pub backend: ServerBackend,
    /// Bound address when listening.
    pub bind: Option<String>,
    /// Number of registered routes.
    pub route_count: usize,
    /// Normalized mount prefixes.
    pub mounts: Vec<String>,
}

impl DispatchAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: DispatchAuditEventParams) -> Self {
        Self {
            event: "dispatch",
            timestamp_ms: now_ms(),
            backend: params.backend,
            http_method: params.http_method,
            route: params.route,
            owner: params.owner,
            action: params.action,
            status_code: params.status_code,
            outcome: params.outcome,
            error_kind: params.error_kind,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
        }
    }
}

impl ServerAuditEvent {
    /// Creates a `routes_registered` event.
    #[must_use]
    pub fn routes_registered(
        backend: ServerBackend,
        route_count: usize,
        mounts: Vec<String>,
    ) -> Self {
        Self {
            event: "routes_registered",
            timestamp_ms: now_ms(),
            backend,
            bind: None,
            route_count,
            mounts,
        }
    }

    /// Creates a `server_listening` event.
    #[must_use]
    pub fn server_listening(
        backend: ServerBackend,
        bind: String,
        route_count: usize,
        mounts: Vec<String>,
    ) -> Self {
        Self {
            event: "server_listening",
            timestamp_ms: now_ms(),
            backend,
            bind: Some(bind),
            route_count,
            mounts,
        }
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for dispatch events.
pub trait DispatchAuditSink: Send + Sync {
    /// Record a dispatch audit event.
    fn record(&self, event: &DispatchAuditEvent);

    /// Record a startup audit event.
    fn record_server(&self, _event: &ServerAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl DispatchAuditSink for StderrAuditSink {
    fn record(&self, event: &DispatchAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_server(&self, event: &ServerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line.
    fn append(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl DispatchAuditSink for FileAuditSink {
    fn record(&self, event: &DispatchAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }

    fn record_server(&self, event: &ServerAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.append(&payload);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl DispatchAuditSink for NoopAuditSink {
    fn record(&self, _event: &DispatchAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
