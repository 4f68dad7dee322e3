// crates/autoroute-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared resource types and helpers for core tests.
// Purpose: Provide a deterministic Counter resource and route lookups.
// Dependencies: autoroute-core
// ============================================================================

//! ## Overview
//! This module provides the `Counter` resource used across core tests, a
//! second `Note` resource with a route name override, and helpers to build
//! catalogs and locate discovered routes.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use autoroute_core::ActionError;
use autoroute_core::ActionSet;
use autoroute_core::HttpMethod;
use autoroute_core::InMemoryResourceStore;
use autoroute_core::RegisteredRoute;
use autoroute_core::Resource;
use autoroute_core::ResourceCatalog;
use autoroute_core::SemanticType;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

// ============================================================================
// SECTION: Counter Resource
// ============================================================================

/// Counter resource exposing increment, rename, and collection actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    /// Current value.
    pub count: i64,
    /// Display name.
    pub name: String,
    /// Number of mutating handler invocations.
    pub calls: u32,
}

impl Resource for Counter {
    const TYPE_NAME: &'static str = "Counter";

    fn register(actions: &mut ActionSet<Self>) {
        actions
            .post("increment")
            .optional("amount", SemanticType::Integer, json!(1))
            .summary("Increment the counter")
            .instance_mut(|counter, args| {
                counter.count += args.integer("amount")?;
                counter.calls += 1;
                Ok(counter.clone())
            });
        actions
            .post("add")
            .path("/add")
            .required("amount", SemanticType::Integer)
            .instance_mut(|counter, args| {
                counter.count += args.integer("amount")?;
                counter.calls += 1;
                Ok(counter.clone())
            });
        actions.post("rename").required("name", SemanticType::String).instance_mut(
            |counter, args| {
                counter.name = args.string("name")?.to_string();
                counter.calls += 1;
                Ok(counter.clone())
            },
        );
        actions.get("show").instance(|counter, _| Ok(counter.clone()));
        actions.delete("reset").instance_mut(|counter, _| {
            counter.count = 0;
            counter.calls += 1;
            Ok(())
        });
        actions
            .post("tag")
            .required("labels", SemanticType::list(SemanticType::String))
            .instance(|_, args| Ok(args.list("labels")?.len()));
        actions.post("fail").instance(|_, _| Err::<(), _>(ActionError::new("counter is locked")));
        actions.post("explode").instance(|_, _| -> Result<(), ActionError> {
            panic!("counter exploded")
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
                if store.load(key)?.is_some() {
                    return Err(ActionError::new(format!("counter '{key}' already exists")));
                }
                let counter = Counter::default();
                store.save(key, &counter)?;
                Ok(counter)
            },
        );
    }
}

// ============================================================================
// SECTION: Note Resource
// ============================================================================

/// Resource with a route name override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note body.
    pub text: String,
}

impl Resource for Note {
    const TYPE_NAME: &'static str = "Note";

    fn route_name() -> Option<&'static str> {
        Some("notes")
    }

    fn register(actions: &mut ActionSet<Self>) {
        actions.get("read").instance(|note, _| Ok(note.text.clone()));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a counter store seeded with `c1` at zero.
#[must_use]
pub fn seeded_counters() -> Arc<InMemoryResourceStore<Counter>> {
    let store = Arc::new(InMemoryResourceStore::new());
    store.insert("c1", Counter::default()).expect("seed counter");
    store
}

/// Returns a note store seeded with `n1`.
#[must_use]
pub fn seeded_notes() -> Arc<InMemoryResourceStore<Note>> {
    let store = Arc::new(InMemoryResourceStore::new());
    store
        .insert(
            "n1",
            Note {
                text: "hello".to_string(),
            },
        )
        .expect("seed note");
    store
}

/// Builds a catalog with `Counter` backed by the given store.
#[must_use]
pub fn counter_catalog(store: Arc<InMemoryResourceStore<Counter>>) -> ResourceCatalog {
    let mut catalog = ResourceCatalog::new();
    catalog.register::<Counter>(store).expect("register counter");
    catalog
}

/// Builds a catalog with `Counter` and `Note`.
#[must_use]
pub fn full_catalog(
    counters: Arc<InMemoryResourceStore<Counter>>,
    notes: Arc<InMemoryResourceStore<Note>>,
) -> ResourceCatalog {
    let mut catalog = counter_catalog(counters);
    catalog.register::<Note>(notes).expect("register note");
    catalog
}

/// Finds the route with the given verb and template.
#[must_use]
pub fn find_route<'a>(
    routes: &'a [RegisteredRoute],
    http_method: HttpMethod,
    template: &str,
) -> &'a RegisteredRoute {
    routes
        .iter()
        .find(|route| route.http_method() == http_method && route.url_template == template)
        .unwrap_or_else(|| panic!("route {http_method} {template} not discovered"))
}
