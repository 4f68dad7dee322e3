// crates/autoroute-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `autoroute.toml`. The output is deterministic and must
//! always pass [`crate::AutorouteConfig::validate`].

/// Returns a canonical example `autoroute.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
backend = "axum"
bind = "127.0.0.1:8080"
max_body_bytes = 1048576
workers = 4
expose_route_manifest = true

[audit]
sink = "file"
path = "autoroute-audit.jsonl"

[[mounts]]
prefix = "/api"
auto_discover = true

[[mounts]]
prefix = "/admin"
auto_discover = false
types = ["Counter"]

[[resources]]
type = "Counter"
route_name = "counters"
"#,
    )
}
