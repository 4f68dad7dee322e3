// crates/autoroute-core/src/runtime/dispatch.rs
// ============================================================================
// Module: Autoroute Dispatch Core
// Description: Framework-agnostic request dispatch for registered actions.
// Purpose: Resolve, coerce, invoke, and normalize in one place for all servers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`Dispatcher`] executes one action for one [`NormalizedRequest`]:
//! 1. Resolve the target (load the instance for instance actions).
//! 2. Extract and coerce declared parameters.
//! 3. Invoke the handler, containing errors and panics.
//! 4. Normalize the payload with the descriptor status code.
//!
//! Every outcome is returned as a [`NormalizedResult`]; adapters never
//! classify errors themselves.
//!
//! ## Invariants
//! - The handler is never invoked when resolution or coercion fails.
//! - A valid request invokes the handler exactly once.
//! - The dispatcher holds no request-scoped state and is shared across
//!   threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;

use crate::core::ActionDescriptor;
use crate::core::DispatchFailure;
use crate::core::NormalizedRequest;
use crate::core::NormalizedResult;
use crate::interfaces::RecordDecoder;
use crate::runtime::coercion::RecordDecoders;
use crate::runtime::coercion::extract_arguments;
use crate::runtime::discovery::RegisteredRoute;
use crate::runtime::registry::ActionHandler;
use crate::runtime::registry::InstanceLookup;
use crate::runtime::registry::InvocationTarget;

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Stateless dispatch core shared by every server adapter.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Record decoders keyed by record name.
    decoders: RecordDecoders,
}

impl Dispatcher {
    /// Creates a dispatcher without record decoders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a decoder for `record(name)` parameters.
    #[must_use]
    pub fn with_record_decoder(
        mut self,
        name: impl Into<String>,
        decoder: Arc<dyn RecordDecoder>,
    ) -> Self {
        self.decoders.insert(name.into(), decoder);
        self
    }

    /// Dispatches a request against a discovered route.
    #[must_use]
    pub fn dispatch_route(
        &self,
        route: &RegisteredRoute,
        request: &NormalizedRequest,
    ) -> NormalizedResult {
        self.dispatch(route.lookup.as_ref(), route.handler.as_ref(), &route.descriptor, request)
    }

    /// Dispatches a request to an action of the given owner.
    #[must_use]
    pub fn dispatch(
        &self,
        owner: &dyn InstanceLookup,
        handler: &dyn ActionHandler,
        descriptor: &ActionDescriptor,
        request: &NormalizedRequest,
    ) -> NormalizedResult {
        let target = match resolve_target(owner, descriptor, request) {
            Ok(target) => target,
            Err(failure) => return NormalizedResult::Error(failure),
        };
        let args = match extract_arguments(&descriptor.parameters, request, &self.decoders) {
            Ok(args) => args,
            Err(err) => {
                return NormalizedResult::Error(DispatchFailure::validation(err.to_string()));
            }
        };
        match catch_unwind(AssertUnwindSafe(|| handler.invoke(target, &args))) {
            Ok(Ok(payload)) => NormalizedResult::Success {
                status_code: descriptor.status_code,
                payload,
            },
            Ok(Err(err)) => NormalizedResult::Error(DispatchFailure::internal(format!(
                "{} failed: {}",
                descriptor.label(),
                err.message()
            ))),
            Err(panic) => NormalizedResult::Error(DispatchFailure::internal(format!(
                "{} panicked: {}",
                descriptor.label(),
                panic_message(panic.as_ref())
            ))),
        }
    }

    /// Returns the registered record decoder names.
    #[must_use]
    pub fn record_decoder_names(&self) -> Vec<String> {
        self.decoders.keys().cloned().collect()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("record_decoders", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the invocation target for a descriptor.
fn resolve_target(
    owner: &dyn InstanceLookup,
    descriptor: &ActionDescriptor,
    request: &NormalizedRequest,
) -> Result<InvocationTarget, DispatchFailure> {
    if !descriptor.is_instance_action {
        return Ok(InvocationTarget::Type);
    }
    let Some(id) = request.instance_id() else {
        return Err(DispatchFailure::not_found(format!(
            "{} instance id missing from request path",
            descriptor.owner
        )));
    };
    match owner.lookup(id) {
        Ok(Some(instance)) => Ok(InvocationTarget::Instance {
            id: id.to_string(),
            instance,
        }),
        Ok(None) => {
            Err(DispatchFailure::not_found(format!("{} '{id}' not found", descriptor.owner)))
        }
        Err(err) => Err(DispatchFailure::internal(format!(
            "failed to load {} '{id}': {err}",
            descriptor.owner
        ))),
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}
