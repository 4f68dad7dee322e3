// crates/autoroute-server/src/tiny_http_adapter.rs
// ============================================================================
// Module: tiny_http Adapter
// Description: Synchronous HTTP server over the route service.
// Purpose: Serve the route table from a fixed pool of worker threads.
// Dependencies: autoroute-core, tiny_http
// ============================================================================

//! ## Overview
//! Workers share one [`tiny_http::Server`] and loop on `recv`. Each request is
//! split into method, path, query, and body (bounded by `max_body_bytes`),
//! then handed to [`RouteService::handle`], which matches the route table and
//! dispatches. [`TinyHttpHandle::shutdown`] unblocks the workers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;

use crate::boundary::JSON_CONTENT_TYPE;
use crate::boundary::ResponseParts;
use crate::routes::RouteService;
use crate::server::RouteServerError;

// ============================================================================
// SECTION: Server
// ============================================================================

/// tiny_http server bound to an address.
pub struct TinyHttpServer {
    /// Shared listening server.
    server: Arc<Server>,
    /// Request pipeline.
    service: Arc<RouteService>,
    /// Worker thread count.
    workers: usize,
}

impl TinyHttpServer {
    /// Binds the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`RouteServerError::Transport`] when binding fails.
    pub fn bind(
        addr: SocketAddr,
        service: Arc<RouteService>,
        workers: usize,
    ) -> Result<Self, RouteServerError> {
        let server = Server::http(addr)
            .map_err(|err| RouteServerError::Transport(format!("http bind failed: {err}")))?;
        Ok(Self {
            server: Arc::new(server),
            service,
            workers: workers.max(1),
        })
    }

    /// Returns the bound address.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serves requests on the worker pool until the server is unblocked.
    ///
    /// # Errors
    ///
    /// Returns [`RouteServerError::Transport`] when a worker panics.
    pub fn run(self) -> Result<(), RouteServerError> {
        self.spawn().join()
    }

    /// Starts the worker pool in the background.
    #[must_use]
    pub fn spawn(self) -> TinyHttpHandle {
        let workers = (0 .. self.workers)
            .map(|_| {
                let server = Arc::clone(&self.server);
                let service = Arc::clone(&self.service);
                thread::spawn(move || worker_loop(&server, &service))
            })
            .collect();
        TinyHttpHandle {
            server: self.server,
            workers,
        }
    }
}

/// Handle to a running worker pool.
pub struct TinyHttpHandle {
    /// Shared listening server.
    server: Arc<Server>,
    /// Worker threads.
    workers: Vec<JoinHandle<()>>,
}

impl TinyHttpHandle {
    /// Unblocks every worker and waits for them to exit.
    ///
    /// # Errors
    ///
    /// Returns [`RouteServerError::Transport`] when a worker panicked.
    pub fn shutdown(self) -> Result<(), RouteServerError> {
        for _ in 0 .. self.workers.len() {
            self.server.unblock();
        }
        self.join()
    }

    /// Waits for every worker to exit.
    fn join(self) -> Result<(), RouteServerError> {
        let mut failed = false;
        for worker in self.workers {
            failed |= worker.join().is_err();
        }
        if failed {
            return Err(RouteServerError::Transport("http worker panicked".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Receives and answers requests until `recv` fails.
fn worker_loop(server: &Server, service: &RouteService) {
    while let Ok(request) = server.recv() {
        handle_request(service, request);
    }
}

/// Normalizes one request, runs the pipeline, and writes the response.
fn handle_request(service: &RouteService, mut request: Request) {
    let method = request.method().to_string();
    let (path, query) = split_url(request.url());
    let limit = service.max_body_bytes();
    let parts = match read_body(&mut request, limit) {
        Ok(body) => service.handle(&method, &path, query.as_deref(), &body),
        Err(received) => service.handle_oversized(&method, &path, received),
    };
    let _ = request.respond(into_response(parts));
}

/// Reads at most `limit` bytes; returns the observed size when over.
fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>, usize> {
    if let Some(declared) = request.body_length()
        && declared > limit
    {
        return Err(declared);
    }
    let mut body = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    if request.as_reader().take(cap).read_to_end(&mut body).is_err() {
        return Ok(Vec::new());
    }
    if body.len() > limit {
        return Err(body.len());
    }
    Ok(body)
}

/// Splits a request target into path and raw query.
fn split_url(url: &str) -> (String, Option<String>) {
    match url.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (url.to_string(), None),
    }
}

/// Converts framework-neutral parts into a tiny_http response.
fn into_response(parts: ResponseParts) -> Response<std::io::Cursor<Vec<u8>>> {
    let status = parts.status_code;
    match parts.body {
        Some(body) => {
            let response = Response::from_data(body).with_status_code(status);
            match Header::from_bytes(&b"Content-Type"[..], JSON_CONTENT_TYPE.as_bytes()) {
                Ok(header) => response.with_header(header),
                Err(()) => response,
            }
        }
        None => Response::from_data(Vec::new()).with_status_code(status),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
