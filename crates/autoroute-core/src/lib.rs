// crates/autoroute-core/src/lib.rs
// ============================================================================
// Module: Autoroute Core Library
// Description: Public API surface for the Autoroute dispatch core.
// Purpose: Expose core types, collaborator interfaces, and runtime engines.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Autoroute exposes methods of domain resource types as HTTP actions. Types
//! declare their actions once; discovery derives URL templates and parameter
//! contracts, and a single dispatch core serves every HTTP backend. The core
//! is backend-agnostic and has no server dependencies.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ActionError;
pub use interfaces::RecordDecodeError;
pub use interfaces::RecordDecoder;
pub use interfaces::ResourceStore;
pub use interfaces::SchemaRecordDecoder;
pub use interfaces::StoreError;
pub use runtime::ActionBuilder;
pub use runtime::ActionHandler;
pub use runtime::ActionSet;
pub use runtime::Arguments;
pub use runtime::CatalogError;
pub use runtime::CoercionError;
pub use runtime::DiscoveryError;
pub use runtime::Dispatcher;
pub use runtime::InMemoryResourceStore;
pub use runtime::Instance;
pub use runtime::InstanceLookup;
pub use runtime::InvocationTarget;
pub use runtime::MountOptions;
pub use runtime::RecordDecoders;
pub use runtime::RegisteredAction;
pub use runtime::RegisteredRoute;
pub use runtime::Resource;
pub use runtime::ResourceCatalog;
pub use runtime::ResourceEntry;
pub use runtime::TypeSelection;
pub use runtime::check_route_conflicts;
pub use runtime::discover;
