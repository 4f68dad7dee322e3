// crates/autoroute-server/src/axum_adapter.rs
// ============================================================================
// Module: Axum Adapter
// Description: Serves the route service on an axum router.
// Purpose: Run the shared request pipeline on tokio with axum's HTTP stack.
// Dependencies: autoroute-core, axum, tokio
// ============================================================================

//! ## Overview
//! The router has a single fallback handler. It reads the body up to the
//! configured limit and hands the request to [`RouteService::handle`] on the
//! blocking pool, so route matching is the same table walk the tiny_http
//! backend uses. Unmatched paths and verbs get the JSON 404 from the pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_LENGTH;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::net::TcpListener;

use crate::boundary::JSON_CONTENT_TYPE;
use crate::boundary::ResponseParts;
use crate::routes::RouteService;
use crate::server::RouteServerError;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the axum router for a route service.
pub fn router(service: Arc<RouteService>) -> Router {
    Router::new().fallback(move |request: Request| {
        let service = Arc::clone(&service);
        async move { handle_request(service, request).await }
    })
}

/// Serves the router on an already bound listener.
///
/// # Errors
///
/// Returns [`RouteServerError::Transport`] when the server fails.
pub async fn serve(
    service: Arc<RouteService>,
    listener: TcpListener,
) -> Result<(), RouteServerError> {
    axum::serve(listener, router(service))
        .await
        .map_err(|_| RouteServerError::Transport("http server failed".to_string()))
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Reads the body and runs the shared pipeline.
async fn handle_request(service: Arc<RouteService>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method.as_str().to_string();
    let path = parts.uri.path().to_string();
    let limit = service.max_body_bytes();
    let Ok(bytes) = axum::body::to_bytes(body, limit).await else {
        let declared = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(limit.saturating_add(1));
        return into_response(service.handle_oversized(&method, &path, declared));
    };
    let query = parts.uri.query().map(str::to_string);
    let response =
        run_blocking(|| service.handle(&method, &path, query.as_deref(), bytes.as_ref()));
    into_response(response)
}

/// Runs dispatch on the blocking pool when the runtime allows it.
fn run_blocking<T>(work: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(work)
        }
        _ => work(),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts framework-neutral parts into an axum response.
fn into_response(parts: ResponseParts) -> Response {
    let status =
        StatusCode::from_u16(parts.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match parts.body {
        Some(body) => {
            (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], Body::from(body)).into_response()
        }
        None => status.into_response(),
    }
}
