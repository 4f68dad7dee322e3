// crates/autoroute-server/tests/backend_parity.rs
// ============================================================================
// Module: Backend Parity Tests
// Description: The same requests against the axum and tiny_http backends.
// Purpose: Validate that both backends resolve and answer requests alike.
// Dependencies: autoroute-server, reqwest, tokio
// ============================================================================

//! ## Overview
//! Starts both backends over identical catalogs and sends each request to
//! both, comparing status codes and JSON bodies. The `Meter` fixture has a
//! literal collection route that overlaps an instance route on another verb.

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

use autoroute_core::ActionSet;
use autoroute_core::InMemoryResourceStore;
use autoroute_core::Resource;
use autoroute_core::ResourceCatalog;
use autoroute_server::NoopAuditSink;
use autoroute_server::RouteService;
use common::build_service;
use common::counter_catalog;
use common::seeded_counters;
use common::start_axum;
use common::start_tiny_http;
use common::test_config;
use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Resource whose collection route shares its path with an instance route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Meter {
    /// Current reading.
    level: i64,
}

impl Resource for Meter {
    const TYPE_NAME: &'static str = "Meter";

    fn register(actions: &mut ActionSet<Self>) {
        actions.post("show").instance(|meter, _| Ok(json!({"level": meter.level})));
        actions.get("overview").path("/all/show").collection(|_, _| Ok(json!({"overview": true})));
    }
}

/// Builds a service with seeded `Meter` and `Counter` stores.
fn parity_service() -> Arc<RouteService> {
    let meters = Arc::new(InMemoryResourceStore::new());
    meters.insert("all", Meter { level: 3 }).unwrap();
    meters.insert("m1", Meter { level: 8 }).unwrap();
    let mut catalog: ResourceCatalog = counter_catalog(seeded_counters());
    catalog.register::<Meter>(meters).unwrap();
    build_service(test_config("/api"), catalog, Arc::new(NoopAuditSink))
}

/// Sends one request and returns the status code and parsed JSON body.
async fn send(client: &reqwest::Client, method: Method, url: String) -> (u16, Option<Value>) {
    let response = client.request(method, url).send().await.unwrap();
    let status = response.status().as_u16();
    let bytes = response.bytes().await.unwrap();
    if bytes.is_empty() {
        return (status, None);
    }
    (status, Some(serde_json::from_slice(&bytes).unwrap()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn both_backends_answer_the_same_requests_alike() {
    let axum_base = start_axum(parity_service()).await;
    let (tiny_base, handle) = start_tiny_http(parity_service());
    let client = reqwest::Client::new();

    let cases = [
        (Method::POST, "/api/meter/all/show", 200, Some(json!({"level": 3}))),
        (Method::GET, "/api/meter/all/show", 200, Some(json!({"overview": true}))),
        (Method::POST, "/api/meter/m1/show", 200, Some(json!({"level": 8}))),
        (Method::POST, "/api/meter/m1/sh%6Fw", 200, Some(json!({"level": 8}))),
        (Method::POST, "/api/counter/c1/incr%65ment", 200, None),
        (Method::GET, "/api/meter/m1/show", 404, None),
        (Method::DELETE, "/api/meter/all/show", 404, None),
        (Method::GET, "/api/nothing/here", 404, None),
    ];

    for (method, path, expected_status, expected_body) in cases {
        let from_axum = send(&client, method.clone(), format!("{axum_base}{path}")).await;
        let from_tiny = send(&client, method.clone(), format!("{tiny_base}{path}")).await;
        assert_eq!(from_axum, from_tiny, "{method} {path}");
        assert_eq!(from_axum.0, expected_status, "{method} {path}");
        if let Some(expected) = expected_body {
            assert_eq!(from_axum.1, Some(expected), "{method} {path}");
        }
        if expected_status == 404 {
            let body = from_axum.1.expect("not found body");
            assert_eq!(body["error"]["type"], json!("NotFound"), "{method} {path}");
        }
    }

    tokio::task::block_in_place(|| handle.shutdown()).unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn percent_encoded_segments_reach_the_same_action() {
    let axum_base = start_axum(parity_service()).await;
    let (tiny_base, handle) = start_tiny_http(parity_service());
    let client = reqwest::Client::new();

    for base in [&axum_base, &tiny_base] {
        let (status, body) =
            send(&client, Method::POST, format!("{base}/api/counter/c1/incr%65ment")).await;
        assert_eq!(status, 200, "{base}");
        assert_eq!(body.unwrap()["count"], json!(1), "{base}");
    }

    tokio::task::block_in_place(|| handle.shutdown()).unwrap();
}
