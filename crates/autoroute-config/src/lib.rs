// crates/autoroute-config/src/lib.rs
// ============================================================================
// Module: Autoroute Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for autoroute.toml semantics.
// Dependencies: autoroute-core, serde, toml
// ============================================================================

//! ## Overview
//! `autoroute-config` defines the configuration model for Autoroute servers:
//! backend selection, bind address and limits, audit sink, mount prefixes,
//! and per-type route name overrides. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
