// crates/autoroute-core/src/runtime/mod.rs
// ============================================================================
// Module: Autoroute Runtime
// Description: Registration, discovery, coercion, and dispatch engines.
// Purpose: Turn registered resources into routes and execute requests.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the startup path (registration and discovery)
//! and the request path (coercion and dispatch). Every server adapter calls
//! into the same [`Dispatcher`] so behavior is identical across backends.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod coercion;
pub mod discovery;
pub mod dispatch;
pub mod registry;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use coercion::Arguments;
pub use coercion::CoercionError;
pub use coercion::RecordDecoders;
pub use coercion::extract_arguments;
pub use discovery::DiscoveryError;
pub use discovery::MountOptions;
pub use discovery::RegisteredRoute;
pub use discovery::TypeSelection;
pub use discovery::check_route_conflicts;
pub use discovery::discover;
pub use dispatch::Dispatcher;
pub use registry::ActionBuilder;
pub use registry::ActionHandler;
pub use registry::ActionSet;
pub use registry::CatalogError;
pub use registry::Instance;
pub use registry::InstanceLookup;
pub use registry::InvocationTarget;
pub use registry::RegisteredAction;
pub use registry::Resource;
pub use registry::ResourceCatalog;
pub use registry::ResourceEntry;
pub use store::InMemoryResourceStore;
