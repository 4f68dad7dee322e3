// crates/autoroute-core/src/runtime/registry.rs
// ============================================================================
// Module: Autoroute Action Registry
// Description: Resource registration side table and typed action builders.
// Purpose: Attach action descriptors to resource methods without reflection.
// Dependencies: crate::{core, interfaces}, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A resource type implements [`Resource`] and declares its HTTP actions in
//! [`Resource::register`] through an [`ActionSet`]. Each declaration produces
//! an immutable [`ActionDescriptor`] and a type-erased [`ActionHandler`]. The
//! [`ResourceCatalog`] is the side table keyed by type name that discovery
//! walks at startup.
//!
//! ## Invariants
//! - Registration is pure metadata; handler closures run only on dispatch.
//! - A type name is registered at most once per catalog.
//! - Mutating instance actions persist the instance through the store only
//!   after the handler succeeds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::ActionDescriptor;
use crate::core::HttpMethod;
use crate::core::MethodName;
use crate::core::ParameterSpec;
use crate::core::RouteName;
use crate::core::SemanticType;
use crate::core::TypeName;
use crate::interfaces::ActionError;
use crate::interfaces::ResourceStore;
use crate::interfaces::StoreError;
use crate::runtime::coercion::Arguments;

// ============================================================================
// SECTION: Resource Trait
// ============================================================================

/// Type-erased loaded instance passed from lookup to handler.
pub type Instance = Box<dyn Any + Send>;

/// Domain type whose methods are exposed as HTTP actions.
pub trait Resource: Sized + Send + 'static {
    /// Type name used in diagnostics and configuration (for example `Counter`).
    const TYPE_NAME: &'static str;

    /// Returns a route name replacing the lowercase type name, if any.
    #[must_use]
    fn route_name() -> Option<&'static str> {
        None
    }

    /// Declares the type's actions.
    fn register(actions: &mut ActionSet<Self>);
}

// ============================================================================
// SECTION: Type-Erased Seams
// ============================================================================

/// Loads instances of one resource type by identifier.
pub trait InstanceLookup: Send + Sync {
    /// Loads an instance, returning `Ok(None)` when the identifier is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing store fails.
    fn lookup(&self, id: &str) -> Result<Option<Instance>, StoreError>;
}

/// Resolved target of an invocation.
pub enum InvocationTarget {
    /// Loaded instance for an instance action.
    Instance {
        /// Instance identifier from the request path.
        id: String,
        /// Loaded instance.
        instance: Instance,
    },
    /// Owning type for a type-level action.
    Type,
}

impl fmt::Debug for InvocationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance {
                id, ..
            } => f.debug_struct("Instance").field("id", id).finish_non_exhaustive(),
            Self::Type => f.write_str("Type"),
        }
    }
}

/// Invokes one registered action.
pub trait ActionHandler: Send + Sync {
    /// Runs the action and returns its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the action, its persistence, or payload
    /// serialization fails.
    fn invoke(&self, target: InvocationTarget, args: &Arguments) -> Result<Value, ActionError>;
}

// ============================================================================
// SECTION: Typed Handlers
// ============================================================================

/// Read-only instance handler.
type InstanceFn<R> = Box<dyn Fn(&R, &Arguments) -> Result<Value, ActionError> + Send + Sync>;
/// Mutating instance handler.
type InstanceMutFn<R> =
    Box<dyn Fn(&mut R, &Arguments) -> Result<Value, ActionError> + Send + Sync>;
/// Type-level handler.
type CollectionFn<R> =
    Box<dyn Fn(&dyn ResourceStore<R>, &Arguments) -> Result<Value, ActionError> + Send + Sync>;

/// Boxed handler closure for one action.
enum HandlerFn<R> {
    /// Runs against a loaded instance.
    Instance(InstanceFn<R>),
    /// Runs against a loaded instance and saves it afterwards.
    InstanceMut(InstanceMutFn<R>),
    /// Runs against the type's store.
    Collection(CollectionFn<R>),
}

/// Typed action handler bound to a resource store.
struct TypedHandler<R> {
    /// Store used for collection actions and saves.
    store: Arc<dyn ResourceStore<R>>,
    /// Handler closure.
    handler: HandlerFn<R>,
}

impl<R: Resource> TypedHandler<R> {
    /// Recovers the concrete instance from a type-erased box.
    fn downcast(instance: Instance) -> Result<R, ActionError> {
        instance
            .downcast::<R>()
            .map(|boxed| *boxed)
            .map_err(|_| ActionError::new(format!("loaded instance is not a {}", R::TYPE_NAME)))
    }
}

impl<R: Resource> ActionHandler for TypedHandler<R> {
    fn invoke(&self, target: InvocationTarget, args: &Arguments) -> Result<Value, ActionError> {
        match (&self.handler, target) {
            (HandlerFn::Collection(handler), _) => handler(self.store.as_ref(), args),
            (
                HandlerFn::Instance(handler),
                InvocationTarget::Instance {
                    instance, ..
                },
            ) => {
                let instance = Self::downcast(instance)?;
                handler(&instance, args)
            }
            (
                HandlerFn::InstanceMut(handler),
                InvocationTarget::Instance {
                    id,
                    instance,
                },
            ) => {
                let mut instance = Self::downcast(instance)?;
                let payload = handler(&mut instance, args)?;
                self.store.save(&id, &instance)?;
                Ok(payload)
            }
            (_, InvocationTarget::Type) => Err(ActionError::new(format!(
                "instance action on {} invoked without an instance",
                R::TYPE_NAME
            ))),
        }
    }
}

/// Instance lookup backed by a typed store.
struct StoreLookup<R> {
    /// Backing store.
    store: Arc<dyn ResourceStore<R>>,
}

impl<R: Resource> InstanceLookup for StoreLookup<R> {
    fn lookup(&self, id: &str) -> Result<Option<Instance>, StoreError> {
        Ok(self.store.load(id)?.map(|instance| Box::new(instance) as Instance))
    }
}

/// Serializes a handler return value into a JSON payload.
fn to_payload<T: Serialize>(value: &T) -> Result<Value, ActionError> {
    Ok(serde_json::to_value(value)?)
}

// ============================================================================
// SECTION: Action Set
// ============================================================================

/// Action declarations collected for one resource type.
pub struct ActionSet<R> {
    /// Declared descriptors and handlers in declaration order.
    actions: Vec<(ActionDescriptor, HandlerFn<R>)>,
}

impl<R: Resource> ActionSet<R> {
    /// Creates an empty action set.
    fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Declares an action with an explicit verb.
    pub fn action(&mut self, http_method: HttpMethod, name: &str) -> ActionBuilder<'_, R> {
        ActionBuilder {
            set: self,
            descriptor: ActionDescriptor::new(
                TypeName::new(R::TYPE_NAME),
                MethodName::new(name),
                http_method,
            ),
        }
    }

    /// Declares a GET action.
    pub fn get(&mut self, name: &str) -> ActionBuilder<'_, R> {
        self.action(HttpMethod::Get, name)
    }

    /// Declares a POST action.
    pub fn post(&mut self, name: &str) -> ActionBuilder<'_, R> {
        self.action(HttpMethod::Post, name)
    }

    /// Declares a PUT action.
    pub fn put(&mut self, name: &str) -> ActionBuilder<'_, R> {
        self.action(HttpMethod::Put, name)
    }

    /// Declares a PATCH action.
    pub fn patch(&mut self, name: &str) -> ActionBuilder<'_, R> {
        self.action(HttpMethod::Patch, name)
    }

    /// Declares a DELETE action (status 204 unless overridden).
    pub fn delete(&mut self, name: &str) -> ActionBuilder<'_, R> {
        self.action(HttpMethod::Delete, name)
    }
}

/// Builder for one action declaration.
///
/// The action is recorded only when a terminal method (`instance`,
/// `instance_mut`, or `collection`) is called.
#[must_use = "finish the declaration with instance, instance_mut, or collection"]
pub struct ActionBuilder<'a, R> {
    /// Owning action set.
    set: &'a mut ActionSet<R>,
    /// Descriptor under construction.
    descriptor: ActionDescriptor,
}

impl<R: Resource> ActionBuilder<'_, R> {
    /// Sets the path override.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.descriptor.path_override = Some(path.into());
        self
    }

    /// Sets the success status code.
    pub fn status(mut self, status_code: u16) -> Self {
        self.descriptor.status_code = status_code;
        self
    }

    /// Appends a parameter contract.
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.descriptor.parameters.push(spec);
        self
    }

    /// Appends a required parameter.
    pub fn required(self, name: &str, semantic_type: SemanticType) -> Self {
        self.param(ParameterSpec::new(name, semantic_type))
    }

    /// Appends an optional parameter with a default value.
    pub fn optional(self, name: &str, semantic_type: SemanticType, default: Value) -> Self {
        self.param(ParameterSpec::new(name, semantic_type).with_default(default))
    }

    /// Sets the documentation summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.descriptor.docs.summary = Some(summary.into());
        self
    }

    /// Sets the documentation description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.docs.description = Some(description.into());
        self
    }

    /// Adds a documentation tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.descriptor.docs.tags.push(tag.into());
        self
    }

    /// Declares the response shape as a JSON Schema fragment.
    pub fn response_shape(mut self, shape: Value) -> Self {
        self.descriptor.docs.response_shape = Some(shape);
        self
    }

    /// Finishes as a read-only instance action.
    pub fn instance<T, F>(self, handler: F)
    where
        T: Serialize,
        F: Fn(&R, &Arguments) -> Result<T, ActionError> + Send + Sync + 'static,
    {
        let handler: InstanceFn<R> =
            Box::new(move |instance, args| to_payload(&handler(instance, args)?));
        self.finish(true, HandlerFn::Instance(handler));
    }

    /// Finishes as a mutating instance action; the instance is saved after
    /// the handler succeeds.
    pub fn instance_mut<T, F>(self, handler: F)
    where
        T: Serialize,
        F: Fn(&mut R, &Arguments) -> Result<T, ActionError> + Send + Sync + 'static,
    {
        let handler: InstanceMutFn<R> =
            Box::new(move |instance, args| to_payload(&handler(instance, args)?));
        self.finish(true, HandlerFn::InstanceMut(handler));
    }

    /// Finishes as a type-level action operating on the store.
    pub fn collection<T, F>(self, handler: F)
    where
        T: Serialize,
        F: Fn(&dyn ResourceStore<R>, &Arguments) -> Result<T, ActionError> + Send + Sync + 'static,
    {
        let handler: CollectionFn<R> =
            Box::new(move |store, args| to_payload(&handler(store, args)?));
        self.finish(false, HandlerFn::Collection(handler));
    }

    /// Records the declaration in the owning set.
    fn finish(self, is_instance_action: bool, handler: HandlerFn<R>) {
        let mut descriptor = self.descriptor;
        descriptor.is_instance_action = is_instance_action;
        self.set.actions.push((descriptor, handler));
    }
}

// ============================================================================
// SECTION: Resource Catalog
// ============================================================================

/// Catalog registration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Type name is already registered.
    #[error("resource type '{name}' is already registered")]
    DuplicateType {
        /// Type name.
        name: String,
    },
    /// Type name is not registered.
    #[error("resource type '{name}' is not registered")]
    UnknownType {
        /// Type name.
        name: String,
    },
}

/// Descriptor and handler for one registered action.
#[derive(Clone)]
pub struct RegisteredAction {
    /// Immutable action metadata.
    pub descriptor: Arc<ActionDescriptor>,
    /// Type-erased handler.
    pub handler: Arc<dyn ActionHandler>,
}

impl fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Catalog entry for one resource type.
#[derive(Clone)]
pub struct ResourceEntry {
    /// Registered type name.
    type_name: TypeName,
    /// Effective route name.
    route_name: RouteName,
    /// Instance lookup bound to the type's store.
    lookup: Arc<dyn InstanceLookup>,
    /// Actions in declaration order.
    actions: Vec<RegisteredAction>,
}

impl ResourceEntry {
    /// Returns the type name.
    #[must_use]
    pub const fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Returns the effective route name.
    #[must_use]
    pub const fn route_name(&self) -> &RouteName {
        &self.route_name
    }

    /// Returns the instance lookup.
    #[must_use]
    pub const fn lookup(&self) -> &Arc<dyn InstanceLookup> {
        &self.lookup
    }

    /// Returns the registered actions in declaration order.
    #[must_use]
    pub fn actions(&self) -> &[RegisteredAction] {
        &self.actions
    }

    /// Returns the action registered under a method name, if any.
    #[must_use]
    pub fn action(&self, method: &str) -> Option<&RegisteredAction> {
        self.actions.iter().find(|action| action.descriptor.method.as_str() == method)
    }
}

impl fmt::Debug for ResourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEntry")
            .field("type_name", &self.type_name)
            .field("route_name", &self.route_name)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

/// Side table of registered resource types.
///
/// # Invariants
/// - Entries are ordered by type name, so discovery is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    /// Entries keyed by type name.
    entries: BTreeMap<TypeName, ResourceEntry>,
}

impl ResourceCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource type backed by the given store.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateType`] when the type is already
    /// registered.
    pub fn register<R: Resource>(
        &mut self,
        store: Arc<dyn ResourceStore<R>>,
    ) -> Result<(), CatalogError> {
        let type_name = TypeName::new(R::TYPE_NAME);
        if self.entries.contains_key(&type_name) {
            return Err(CatalogError::DuplicateType {
                name: type_name.to_string(),
            });
        }
        let mut set = ActionSet::<R>::new();
        R::register(&mut set);
        let actions = set
            .actions
            .into_iter()
            .map(|(descriptor, handler)| RegisteredAction {
                descriptor: Arc::new(descriptor),
                handler: Arc::new(TypedHandler {
                    store: Arc::clone(&store),
                    handler,
                }),
            })
            .collect();
        let route_name =
            R::route_name().map_or_else(|| RouteName::default_for(&type_name), RouteName::new);
        let entry = ResourceEntry {
            type_name: type_name.clone(),
            route_name,
            lookup: Arc::new(StoreLookup {
                store,
            }),
            actions,
        };
        self.entries.insert(type_name, entry);
        Ok(())
    }

    /// Replaces the route name of a registered type.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownType`] when the type is not registered.
    pub fn set_route_name(
        &mut self,
        type_name: &TypeName,
        route_name: RouteName,
    ) -> Result<(), CatalogError> {
        let entry = self.entries.get_mut(type_name).ok_or_else(|| CatalogError::UnknownType {
            name: type_name.to_string(),
        })?;
        entry.route_name = route_name;
        Ok(())
    }

    /// Returns the entry for a type name.
    #[must_use]
    pub fn get(&self, type_name: &TypeName) -> Option<&ResourceEntry> {
        self.entries.get(type_name)
    }

    /// Returns true when the type is registered.
    #[must_use]
    pub fn contains(&self, type_name: &TypeName) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Iterates entries in type-name order.
    pub fn entries(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.values()
    }

    /// Returns the registered type names in order.
    #[must_use]
    pub fn type_names(&self) -> Vec<TypeName> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
