// crates/autoroute-server/tests/axum_adapter.rs
// ============================================================================
// Module: Axum Adapter Tests
// Description: HTTP round trips against the axum backend.
// Purpose: Validate routing, coercion, status mapping, and fallbacks over TCP.
// Dependencies: autoroute-server, reqwest, tokio
// ============================================================================

//! ## Overview
//! Starts the axum backend on an ephemeral port with the `Counter` fixture and
//! drives it with an async HTTP client.

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
use autoroute_server::DispatchOutcome;
use common::RecordingAuditSink;
use common::build_service;
use common::counter_catalog;
use common::seeded_counters;
use common::start_axum;
use common::test_config;
use serde_json::Value;
use serde_json::json;

/// Starts the backend and returns its base URL and audit capture.
async fn start(config: AutorouteConfig) -> (String, Arc<RecordingAuditSink>) {
    let audit = Arc::new(RecordingAuditSink::default());
    let service = build_service(config, counter_catalog(seeded_counters()), audit.clone());
    (start_axum(service).await, audit)
}

#[tokio::test(flavor = "multi_thread")]
async fn increment_uses_default_and_query_amount() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client.post(format!("{base}/api/counter/c1/increment")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], json!(1));

    let response =
        client.post(format!("{base}/api/counter/c1/increment?amount=5")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], json!(6));
}

#[tokio::test(flavor = "multi_thread")]
async fn json_body_supplies_required_parameter() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/counter/c1/add"))
        .json(&json!({"amount": 7}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], json!(7));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_instance_is_not_found() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response =
        client.post(format!("{base}/api/counter/missing/increment")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("NotFound"));
    assert!(body["error"]["message"].as_str().unwrap().contains("missing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_required_parameter_is_validation_error() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client.post(format!("{base}/api/counter/c1/rename")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("ValidationError"));
    assert!(body["error"]["message"].as_str().unwrap().contains("name"));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_returns_no_content_and_create_returns_created() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client.delete(format!("{base}/api/counter/c1/reset")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 204);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = client
        .post(format!("{base}/api/counter/create"))
        .json(&json!({"key": "c2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = client.get(format!("{base}/api/counter/list_all")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn unmatched_path_and_wrong_method_return_json_not_found() {
    let (base, audit) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/api/nothing/here")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("NotFound"));

    let response = client.get(format!("{base}/api/counter/c1/increment")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("NotFound"));

    let events = audit.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| event.outcome == DispatchOutcome::Unmatched));
}

#[tokio::test(flavor = "multi_thread")]
async fn trailing_slash_matches_route() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/api/counter/c1/show/")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], json!(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn route_manifest_is_served_when_exposed() {
    let mut config = test_config("/api");
    config.server.expose_route_manifest = true;
    let (base, _) = start(config).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/api/_routes")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["openapi"], json!("3.1.0"));
    assert!(body["paths"]["/api/counter/{id}/increment"]["post"].is_object());
}

#[tokio::test(flavor = "multi_thread")]
async fn route_manifest_is_hidden_by_default() {
    let (base, _) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/api/_routes")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_body_is_rejected() {
    let mut config = test_config("/api");
    config.server.max_body_bytes = 64;
    let (base, audit) = start(config).await;
    let client = reqwest::Client::new();

    let padding = "x".repeat(512);
    let response = client
        .post(format!("{base}/api/counter/c1/add"))
        .json(&json!({"amount": 1, "padding": padding}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 413);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["type"], json!("PayloadTooLarge"));

    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, DispatchOutcome::Rejected);
    assert_eq!(events[0].status_code, 413);
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_is_audited_with_route_and_action() {
    let (base, audit) = start(test_config("/api")).await;
    let client = reqwest::Client::new();

    let response =
        client.post(format!("{base}/api/counter/c1/increment?amount=2")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let events = audit.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event, "dispatch");
    assert_eq!(event.route.as_deref(), Some("/api/counter/{id}/increment"));
    assert_eq!(event.owner.as_deref(), Some("Counter"));
    assert_eq!(event.action.as_deref(), Some("increment"));
    assert_eq!(event.outcome, DispatchOutcome::Ok);
    assert!(event.response_bytes > 0);
}
