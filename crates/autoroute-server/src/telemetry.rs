// crates/autoroute-server/src/telemetry.rs
// ============================================================================
// Module: Dispatch Telemetry
// Description: Observability hooks for HTTP dispatch.
// Purpose: Provide metric events without hard exporter deps.
// Dependencies: autoroute-config, serde
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for dispatch counters and
//! latency histograms. Deployments plug in their own exporter by implementing
//! [`DispatchMetrics`]. Labels carry route templates, never concrete ids.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use autoroute_config::ServerBackend;
use autoroute_core::ErrorKind;
use autoroute_core::HttpMethod;
use serde::Serialize;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Dispatch outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Handler returned a payload.
    Ok,
    /// Dispatch produced an error result.
    Error,
    /// No route matched the request.
    Unmatched,
    /// Request rejected before dispatch (for example an oversized body).
    Rejected,
}

impl DispatchOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Unmatched => "unmatched",
            Self::Rejected => "rejected",
        }
    }
}

/// Dispatch metric event payload.
///
/// # Invariants
/// - `route` is the URL template, `None` when nothing matched.
#[derive(Debug, Clone)]
pub struct DispatchMetricEvent {
    /// Backend serving the request.
    pub backend: ServerBackend,
    /// Request method, `None` for verbs outside the supported set.
    pub http_method: Option<HttpMethod>,
    /// Matched URL template.
    pub route: Option<String>,
    /// Request outcome.
    pub outcome: DispatchOutcome,
    /// Error kind when dispatch failed.
    pub error_kind: Option<ErrorKind>,
    /// Response status code.
    pub status_code: u16,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for dispatched requests and latencies.
pub trait DispatchMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: DispatchMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: DispatchMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are discarded.
pub struct NoopMetrics;

impl DispatchMetrics for NoopMetrics {
    fn record_request(&self, _event: DispatchMetricEvent) {}

    fn record_latency(&self, _event: DispatchMetricEvent, _latency: Duration) {}
}
