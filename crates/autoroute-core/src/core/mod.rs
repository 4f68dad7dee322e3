// crates/autoroute-core/src/core/mod.rs
// ============================================================================
// Module: Autoroute Core Types
// Description: Action descriptors, route paths, and normalized request/result.
// Purpose: Provide stable, framework-independent types for routing and dispatch.
// Dependencies: percent-encoding, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types describe what a resource exposes over HTTP and how a single
//! request flows through dispatch. They carry no server backend types so that
//! every adapter shares the same contract.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod action;
pub mod identifiers;
pub mod path;
pub mod request;
pub mod result;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use action::ActionDescriptor;
pub use action::DEFAULT_STATUS_CODE;
pub use action::DELETE_STATUS_CODE;
pub use action::DocMetadata;
pub use action::HttpMethod;
pub use action::ParameterSpec;
pub use action::SemanticType;
pub use identifiers::MethodName;
pub use identifiers::RouteName;
pub use identifiers::TypeName;
pub use path::ID_PLACEHOLDER;
pub use path::RouteError;
pub use path::RouteTemplate;
pub use path::TemplateSegment;
pub use path::build_path;
pub use path::join_prefix;
pub use path::normalize_prefix;
pub use request::ID_PARAM;
pub use request::NormalizedRequest;
pub use result::DispatchFailure;
pub use result::ErrorKind;
pub use result::NormalizedResult;
pub use result::status_allows_body;
