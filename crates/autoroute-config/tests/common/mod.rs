// crates/autoroute-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for autoroute-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use autoroute_config::AutorouteConfig;
use autoroute_config::MountConfig;

/// Parses a TOML string into an `AutorouteConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<AutorouteConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<AutorouteConfig, toml::de::Error> {
    config_from_toml("")
}

/// Returns an explicit-selection mount for the provided types.
pub fn explicit_mount(prefix: &str, types: &[&str]) -> MountConfig {
    MountConfig {
        prefix: prefix.to_string(),
        auto_discover: false,
        types: types.iter().map(|name| (*name).to_string()).collect(),
    }
}
