// demos/counter/src/main.rs
// ============================================================================
// Module: Counter Demo Entry Point
// Description: Serves the Counter resource over a configurable backend.
// Purpose: Run the full config, discovery, and serving path end to end.
// Dependencies: autoroute-config, autoroute-core, autoroute-server, clap, tokio
// ============================================================================

//! ## Overview
//! Loads configuration from `--config` (or `AUTOROUTE_CONFIG`), falls back to
//! built-in defaults otherwise, applies `--backend` and `--bind` overrides, seeds
//! one counter, and serves the catalog until the process is stopped.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod counter;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use autoroute_config::AutorouteConfig;
use autoroute_config::CONFIG_ENV_VAR;
use autoroute_config::ServerBackend;
use autoroute_core::InMemoryResourceStore;
use autoroute_server::RouteServer;
use clap::Parser;
use clap::ValueEnum;
use thiserror::Error;

use crate::counter::Counter;
use crate::counter::demo_catalog;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Command line for the counter demo.
#[derive(Parser, Debug)]
#[command(name = "autoroute-counter", about = "Serve a Counter resource over HTTP")]
struct Cli {
    /// Config file path (defaults to `AUTOROUTE_CONFIG`, then built-in defaults).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Backend override.
    #[arg(long, value_enum, value_name = "BACKEND")]
    backend: Option<BackendArg>,
    /// Bind address override (for example `127.0.0.1:8080`).
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Do not seed the `demo` counter.
    #[arg(long)]
    empty: bool,
}

/// Backend names accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    /// Async axum server.
    Axum,
    /// Synchronous tiny_http server.
    TinyHttp,
}

impl From<BackendArg> for ServerBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Axum => Self::Axum,
            BackendArg::TinyHttp => Self::TinyHttp,
        }
    }
}

/// Demo failures reported on stderr.
#[derive(Debug, Error)]
enum DemoError {
    /// Configuration could not be loaded.
    #[error("config load failed: {0}")]
    Config(String),
    /// Catalog or server setup failed.
    #[error("server init failed: {0}")]
    Init(String),
    /// Serving stopped with an error.
    #[error("server failed: {0}")]
    Serve(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Demo entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads config, builds the catalog, and serves it.
async fn run(cli: Cli) -> Result<(), DemoError> {
    let mut config = load_config(&cli)?;
    if let Some(backend) = cli.backend {
        config.server.backend = backend.into();
    }
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let store = Arc::new(InMemoryResourceStore::new());
    if !cli.empty {
        store
            .insert(
                "demo",
                Counter {
                    count: 0,
                    name: "demo".to_string(),
                },
            )
            .map_err(|err| DemoError::Init(err.to_string()))?;
    }
    let catalog = demo_catalog(store).map_err(|err| DemoError::Init(err.to_string()))?;
    let server =
        RouteServer::from_config(config, catalog).map_err(|err| DemoError::Init(err.to_string()))?;
    server.serve().await.map_err(|err| DemoError::Serve(err.to_string()))
}

/// Loads the config file when one is named, or the built-in defaults.
fn load_config(cli: &Cli) -> Result<AutorouteConfig, DemoError> {
    if cli.config.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_none() {
        return Ok(AutorouteConfig::default());
    }
    AutorouteConfig::load(cli.config.as_deref()).map_err(|err| DemoError::Config(err.to_string()))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}
