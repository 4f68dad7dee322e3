// crates/autoroute-server/tests/common/mod.rs
// ============================================================================
// Module: Server Test Fixtures
// Description: Shared resources, configs, and sinks for adapter tests.
// Purpose: Run both adapters against the same catalog and expectations.
// Dependencies: autoroute-server, autoroute-config, autoroute-core
// ============================================================================

//! ## Overview
//! Provides a `Counter` resource, config builders, a recording audit sink,
//! and helpers that start each backend on an ephemeral local port.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use autoroute_config::AuditSinkKind;
use autoroute_config::AutorouteConfig;
use autoroute_config::MountConfig;
use autoroute_core::ActionSet;
use autoroute_core::InMemoryResourceStore;
use autoroute_core::Resource;
use autoroute_core::ResourceCatalog;
use autoroute_core::SemanticType;
use autoroute_server::DispatchAuditEvent;
use autoroute_server::DispatchAuditSink;
use autoroute_server::RouteServer;
use autoroute_server::RouteService;
use autoroute_server::TinyHttpHandle;
use autoroute_server::TinyHttpServer;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

// ============================================================================
// SECTION: Counter Resource
// ============================================================================

/// Counter resource used by adapter tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Current value.
    pub count: i64,
    /// Display name.
    pub name: String,
}

impl Resource for Counter {
    const TYPE_NAME: &'static str = "Counter";

    fn register(actions: &mut ActionSet<Self>) {
        actions
            .post("increment")
            .optional("amount", SemanticType::Integer, json!(1))
            .summary("Increment the counter")
            .tag("counters")
            .instance_mut(|counter, args| {
                counter.count += args.integer("amount")?;
                Ok(counter.clone())
            });
        actions.post("add").path("/add").required("amount", SemanticType::Integer).instance_mut(
            |counter, args| {
                counter.count += args.integer("amount")?;
                Ok(counter.clone())
            },
        );
        actions.post("rename").required("name", SemanticType::String).instance_mut(
            |counter, args| {
                counter.name = args.string("name")?.to_string();
                Ok(counter.clone())
            },
        );
        actions.get("show").instance(|counter, _| Ok(counter.clone()));
        actions.delete("reset").instance_mut(|counter, _| {
            counter.count = 0;
            Ok(())
        });
        actions.get("list_all").collection(|store, _| {
            let counters = store.list()?;
            Ok(counters
                .into_iter()
                .map(|(id, counter)| json!({"id": id, "count": counter.count}))
                .collect::<Vec<_>>())
        });
        actions.post("create").status(201).required("key", SemanticType::String).collection(
            |store, args| {
                let key = args.string("key")?;
                let counter = Counter::default();
                store.save(key, &counter)?;
                Ok(counter)
            },
        );
    }
}

// ============================================================================
// SECTION: Catalog and Config
// ============================================================================

/// Returns a counter store seeded with `c1` at zero.
#[must_use]
pub fn seeded_counters() -> Arc<InMemoryResourceStore<Counter>> {
    let store = Arc::new(InMemoryResourceStore::new());
    store.insert("c1", Counter::default()).expect("seed counter");
    store
}

/// Builds a catalog with `Counter` backed by the given store.
#[must_use]
pub fn counter_catalog(store: Arc<InMemoryResourceStore<Counter>>) -> ResourceCatalog {
    let mut catalog = ResourceCatalog::new();
    catalog.register::<Counter>(store).expect("register counter");
    catalog
}

/// Returns a validated-on-build config with audit disabled and one mount.
#[must_use]
pub fn test_config(prefix: &str) -> AutorouteConfig {
    let mut config = AutorouteConfig::default();
    config.server.bind = "127.0.0.1:0".to_string();
    config.audit.sink = AuditSinkKind::None;
    config.mounts = vec![MountConfig {
        prefix: prefix.to_string(),
        ..MountConfig::default()
    }];
    config
}

/// Builds the route service for the config, catalog, and audit sink.
#[must_use]
pub fn build_service(
    config: AutorouteConfig,
    catalog: ResourceCatalog,
    audit: Arc<dyn DispatchAuditSink>,
) -> Arc<RouteService> {
    RouteServer::from_config(config, catalog)
        .expect("server from config")
        .with_audit_sink(audit)
        .into_service()
}

// ============================================================================
// SECTION: Audit Capture
// ============================================================================

/// Audit sink that keeps every dispatch event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured events.
    events: Mutex<Vec<DispatchAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns a copy of the captured events.
    #[must_use]
    pub fn events(&self) -> Vec<DispatchAuditEvent> {
        self.events.lock().expect("audit lock").clone()
    }
}

impl DispatchAuditSink for RecordingAuditSink {
    fn record(&self, event: &DispatchAuditEvent) {
        self.events.lock().expect("audit lock").push(event.clone());
    }
}

// ============================================================================
// SECTION: Backends
// ============================================================================

/// Starts the tiny_http backend on an ephemeral port.
#[must_use]
pub fn start_tiny_http(service: Arc<RouteService>) -> (String, TinyHttpHandle) {
    let server =
        TinyHttpServer::bind("127.0.0.1:0".parse().expect("addr"), service, 2).expect("bind");
    let addr = server.local_addr().expect("local addr");
    (format!("http://{addr}"), server.spawn())
}

/// Starts the axum backend on an ephemeral port inside the current runtime.
pub async fn start_axum(service: Arc<RouteService>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let _server = tokio::spawn(autoroute_server::axum_adapter::serve(service, listener));
    format!("http://{addr}")
}
