// crates/autoroute-core/src/runtime/store.rs
// ============================================================================
// Module: Autoroute In-Memory Store
// Description: Simple in-memory resource store for tests and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`ResourceStore`] for tests and local demos. It is not intended for
//! production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::ResourceStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory resource store keyed by identifier.
#[derive(Debug, Clone)]
pub struct InMemoryResourceStore<R> {
    /// Instance map protected by a mutex.
    instances: Arc<Mutex<BTreeMap<String, R>>>,
}

impl<R> Default for InMemoryResourceStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> InMemoryResourceStore<R> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Inserts or replaces an instance.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn insert(&self, id: impl Into<String>, instance: R) -> Result<(), StoreError> {
        self.instances
            .lock()
            .map_err(|_| StoreError::Store("resource store mutex poisoned".to_string()))?
            .insert(id.into(), instance);
        Ok(())
    }

    /// Returns the number of stored instances.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self
            .instances
            .lock()
            .map_err(|_| StoreError::Store("resource store mutex poisoned".to_string()))?;
        Ok(guard.len())
    }
}

impl<R: Clone + Send> ResourceStore<R> for InMemoryResourceStore<R> {
    fn load(&self, id: &str) -> Result<Option<R>, StoreError> {
        let guard = self
            .instances
            .lock()
            .map_err(|_| StoreError::Store("resource store mutex poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn save(&self, id: &str, instance: &R) -> Result<(), StoreError> {
        self.instances
            .lock()
            .map_err(|_| StoreError::Store("resource store mutex poisoned".to_string()))?
            .insert(id.to_string(), instance.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<(String, R)>, StoreError> {
        let guard = self
            .instances
            .lock()
            .map_err(|_| StoreError::Store("resource store mutex poisoned".to_string()))?;
        Ok(guard.iter().map(|(id, instance)| (id.clone(), instance.clone())).collect())
    }
}
