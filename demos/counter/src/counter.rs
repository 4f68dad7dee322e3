// demos/counter/src/counter.rs
// ============================================================================
// Module: Counter Resource
// Description: Demo resource exposing counter actions over HTTP.
// Purpose: Show instance and type-level actions on one registered type.
// Dependencies: autoroute-core, serde, serde_json
// ============================================================================

//! ## Overview
//! `Counter` registers four instance actions (`increment`, `add`, `rename`,
//! `reset`) and two type-level actions (`list_all`, `create`). Mutating
//! instance actions are saved back to the store after they return.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use autoroute_core::ActionError;
use autoroute_core::ActionSet;
use autoroute_core::CatalogError;
use autoroute_core::InMemoryResourceStore;
use autoroute_core::Resource;
use autoroute_core::ResourceCatalog;
use autoroute_core::SemanticType;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

// ============================================================================
// SECTION: Resource
// ============================================================================

/// A named integer counter.
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
                counter.count = counter
                    .count
                    .checked_add(args.integer("amount")?)
                    .ok_or_else(|| ActionError::new("counter overflow"))?;
                Ok(counter.clone())
            });
        actions
            .post("add")
            .path("/add")
            .required("amount", SemanticType::Integer)
            .summary("Add an amount to the counter")
            .tag("counters")
            .instance_mut(|counter, args| {
                counter.count = counter
                    .count
                    .checked_add(args.integer("amount")?)
                    .ok_or_else(|| ActionError::new("counter overflow"))?;
                Ok(counter.clone())
            });
        actions
            .post("rename")
            .required("name", SemanticType::String)
            .summary("Rename the counter")
            .tag("counters")
            .instance_mut(|counter, args| {
                counter.name = args.string("name")?.to_string();
                Ok(counter.clone())
            });
        actions.delete("reset").summary("Reset the counter to zero").tag("counters").instance_mut(
            |counter, _| {
                counter.count = 0;
                Ok(())
            },
        );
        actions.get("list_all").summary("List every counter").tag("counters").collection(
            |store, _| {
                let counters = store.list()?;
                Ok(counters
                    .into_iter()
                    .map(|(id, counter)| {
                        json!({"id": id, "name": counter.name, "count": counter.count})
                    })
                    .collect::<Vec<_>>())
            },
        );
        actions
            .post("create")
            .status(201)
            .required("key", SemanticType::String)
            .optional("name", SemanticType::String, json!(""))
            .summary("Create a counter at zero")
            .tag("counters")
            .collection(|store, args| {
                let key = args.string("key")?;
                if store.load(key)?.is_some() {
                    return Err(ActionError::new(format!("counter '{key}' already exists")));
                }
                let counter = Counter {
                    count: 0,
                    name: args.string("name")?.to_string(),
                };
                store.save(key, &counter)?;
                Ok(json!({"id": key, "name": counter.name, "count": counter.count}))
            });
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Builds the demo catalog over a shared counter store.
///
/// # Errors
///
/// Returns [`CatalogError`] when registration fails.
pub fn demo_catalog(
    store: Arc<InMemoryResourceStore<Counter>>,
) -> Result<ResourceCatalog, CatalogError> {
    let mut catalog = ResourceCatalog::new();
    catalog.register::<Counter>(store)?;
    Ok(catalog)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
