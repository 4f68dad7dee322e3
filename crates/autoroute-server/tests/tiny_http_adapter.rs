// crates/autoroute-server/tests/tiny_http_adapter.rs
// ============================================================================
// Module: tiny_http Adapter Tests
// Description: HTTP round trips against the tiny_http backend.
// Purpose: Validate that the synchronous backend matches axum's behavior.
// Dependencies: autoroute-server, reqwest
// ============================================================================

//! ## Overview
//! Starts the tiny_http worker pool on an ephemeral port with the `Counter`
//! fixture and drives it with a blocking HTTP client.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;

use autoroute_config::AutorouteConfig;
use autoroute_config::ServerBackend;
use autoroute_server::DispatchOutcome;
use autoroute_server::TinyHttpHandle;
use common::RecordingAuditSink;
use common::build_service;
use common::counter_catalog;
use common::seeded_counters;
use common::start_tiny_http;
use common::test_config;
use reqwest::blocking::Client;
use serde_json::Value;
use serde_json::json;

/// Running backend with its audit capture.
struct Running {
    /// Base URL.
    base: String,
    /// Worker pool handle.
    handle: TinyHttpHandle,
    /// Captured audit events.
    audit: Arc<RecordingAuditSink>,
}

/// Starts the backend for `config`.
fn start(mut config: AutorouteConfig) -> Running {
    config.server.backend = ServerBackend::TinyHttp;
    let audit = Arc::new(RecordingAuditSink::default());
    let service = build_service(config, counter_catalog(seeded_counters()), audit.clone());
    let (base, handle) = start_tiny_http(service);
    Running {
        base,
        handle,
        audit,
    }
}

#[test]
fn increment_uses_default_and_query_amount() {
    let running = start(test_config("/api"));
    let client = Client::new();
    let base = &running.base;

    let response = client.post(format!("{base}/api/counter/c1/increment")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().unwrap();
    assert_eq!(body["count"], json!(1));

    let response = client.post(format!("{base}/api/counter/c1/increment?amount=5")).send().unwrap();
    let body: Value = response.json().unwrap();
    assert_eq!(body["count"], json!(6));

    running.handle.shutdown().unwrap();
}

#[test]
fn json_body_and_status_codes_match_axum() {
    let running = start(test_config("/api"));
    let client = Client::new();
    let base = &running.base;

    let response = client
        .post(format!("{base}/api/counter/c1/add"))
        .json(&json!({"amount": 3}))
        .send()
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().unwrap();
    assert_eq!(body["count"], json!(3));

    let response = client.post(format!("{base}/api/counter/c1/rename")).send().unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], json!("ValidationError"));

    let response = client.delete(format!("{base}/api/counter/c1/reset")).send().unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert!(response.bytes().unwrap().is_empty());

    let response = client
        .post(format!("{base}/api/counter/create"))
        .json(&json!({"key": "c9"}))
        .send()
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    running.handle.shutdown().unwrap();
}

#[test]
fn unknown_instance_and_unmatched_paths_are_not_found() {
    let running = start(test_config("/api"));
    let client = Client::new();
    let base = &running.base;

    let response = client.get(format!("{base}/api/counter/ghost/show")).send().unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().unwrap();
    assert!(body["error"]["message"].as_str().unwrap().contains("ghost"));

    let response = client.get(format!("{base}/elsewhere")).send().unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], json!("NotFound"));

    let response = client.put(format!("{base}/api/counter/c1/increment")).send().unwrap();
    assert_eq!(response.status().as_u16(), 404);

    running.handle.shutdown().unwrap();
}

#[test]
fn trailing_slash_and_manifest_are_served() {
    let mut config = test_config("/api");
    config.server.expose_route_manifest = true;
    let running = start(config);
    let client = Client::new();
    let base = &running.base;

    let response = client.get(format!("{base}/api/counter/c1/show/")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client.get(format!("{base}/api/_routes/")).send().unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().unwrap();
    assert_eq!(body["openapi"], json!("3.1.0"));

    running.handle.shutdown().unwrap();
}

#[test]
fn oversized_body_is_rejected_and_audited() {
    let mut config = test_config("/api");
    config.server.max_body_bytes = 32;
    let running = start(config);
    let client = Client::new();
    let base = &running.base;

    let response = client
        .post(format!("{base}/api/counter/c1/add"))
        .json(&json!({"amount": 1, "padding": "y".repeat(256)}))
        .send()
        .unwrap();
    assert_eq!(response.status().as_u16(), 413);
    let body: Value = response.json().unwrap();
    assert_eq!(body["error"]["type"], json!("PayloadTooLarge"));

    let events = running.audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, DispatchOutcome::Rejected);
    assert_eq!(events[0].route.as_deref(), Some("/api/counter/{id}/add"));
    assert_eq!(events[0].backend, ServerBackend::TinyHttp);

    running.handle.shutdown().unwrap();
}
