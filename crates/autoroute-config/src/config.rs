// crates/autoroute-config/src/config.rs
// ============================================================================
// Module: Autoroute Configuration
// Description: Configuration loading and validation for Autoroute servers.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: autoroute-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown fields are rejected. Missing or invalid configuration fails closed
//! so that a server never starts with a half-understood route layout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use autoroute_core::MountOptions;
use autoroute_core::RouteName;
use autoroute_core::TypeName;
use autoroute_core::TypeSelection;
use autoroute_core::normalize_prefix;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "autoroute.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "AUTOROUTE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default bind address.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Upper bound for `server.max_body_bytes`.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Upper bound for `server.workers`.
pub(crate) const MAX_WORKERS: usize = 256;
/// Maximum number of mounts.
pub(crate) const MAX_MOUNTS: usize = 64;
/// Maximum number of resource overrides.
pub(crate) const MAX_RESOURCE_OVERRIDES: usize = 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Autoroute server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutorouteConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Mount prefixes; empty means one auto-discover mount at the root.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
    /// Per-type route name overrides.
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl AutorouteConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed or has
    /// unknown fields.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates the configuration and normalizes mount prefixes in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.audit.validate()?;
        if self.mounts.len() > MAX_MOUNTS {
            return Err(ConfigError::Invalid(format!("at most {MAX_MOUNTS} mounts are allowed")));
        }
        let mut prefixes = BTreeSet::new();
        for mount in &mut self.mounts {
            mount.validate()?;
            if !prefixes.insert(mount.prefix.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate mount prefix '{}'",
                    display_prefix(&mount.prefix)
                )));
            }
        }
        if self.resources.len() > MAX_RESOURCE_OVERRIDES {
            return Err(ConfigError::Invalid(format!(
                "at most {MAX_RESOURCE_OVERRIDES} resource overrides are allowed"
            )));
        }
        let mut types = BTreeSet::new();
        let mut route_names = BTreeSet::new();
        for resource in &self.resources {
            resource.validate()?;
            if !types.insert(resource.type_name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate resources entry for type '{}'",
                    resource.type_name
                )));
            }
            if let Some(route_name) = &resource.route_name
                && !route_names.insert(route_name.as_str())
            {
                return Err(ConfigError::Invalid(format!(
                    "route_name '{route_name}' is assigned to more than one type"
                )));
            }
        }
        Ok(())
    }

    /// Returns the configured mounts, or a single root auto-discover mount.
    #[must_use]
    pub fn effective_mounts(&self) -> Vec<MountConfig> {
        if self.mounts.is_empty() { vec![MountConfig::default()] } else { self.mounts.clone() }
    }

    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the bind address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_addr()
    }

    /// Returns the configured route name overrides.
    #[must_use]
    pub fn route_overrides(&self) -> Vec<(TypeName, RouteName)> {
        self.resources
            .iter()
            .filter_map(|resource| {
                resource.route_name.as_ref().map(|route_name| {
                    (TypeName::new(resource.type_name.trim()), RouteName::new(route_name.trim()))
                })
            })
            .collect()
    }
}

/// HTTP server backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerBackend {
    /// Async axum server on the tokio runtime.
    #[default]
    Axum,
    /// Synchronous `tiny_http` server with worker threads.
    TinyHttp,
}

impl ServerBackend {
    /// Returns the stable backend label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Axum => "axum",
            Self::TinyHttp => "tiny_http",
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// HTTP backend.
    #[serde(default)]
    pub backend: ServerBackend,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Worker threads for the `tiny_http` backend.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Serve the route manifest at `<prefix>/_routes`.
    #[serde(default)]
    pub expose_route_manifest: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend: ServerBackend::default(),
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            workers: default_workers(),
            expose_route_manifest: false,
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be at most {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "workers must be between 1 and {MAX_WORKERS}"
            )));
        }
        Ok(())
    }

    /// Parses the bind address.
    fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self.bind.trim();
        if bind.is_empty() {
            return Err(ConfigError::Invalid("server.bind must be set".to_string()));
        }
        bind.parse().map_err(|_| ConfigError::Invalid(format!("invalid bind address '{bind}'")))
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines), required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                let message = "audit.path is only valid with audit.sink=file";
                Err(ConfigError::Invalid(message.to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

/// One mount prefix and its type selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MountConfig {
    /// URL prefix (normalized to `""` or `/a/b` by validation).
    #[serde(default)]
    pub prefix: String,
    /// Mount every registered type.
    #[serde(default = "default_auto_discover")]
    pub auto_discover: bool,
    /// Explicit type names when `auto_discover` is false.
    #[serde(default)]
    pub types: Vec<String>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            auto_discover: default_auto_discover(),
            types: Vec::new(),
        }
    }
}

impl MountConfig {
    /// Validates the mount and normalizes its prefix.
    fn validate(&mut self) -> Result<(), ConfigError> {
        self.prefix = normalize_prefix(&self.prefix)
            .map_err(|err| ConfigError::Invalid(format!("mounts.prefix: {err}")))?;
        if self.auto_discover && !self.types.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "mount '{}': types requires auto_discover = false",
                display_prefix(&self.prefix)
            )));
        }
        if !self.auto_discover && self.types.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "mount '{}': auto_discover = false requires at least one type",
                display_prefix(&self.prefix)
            )));
        }
        let mut seen = BTreeSet::new();
        for type_name in &self.types {
            let trimmed = type_name.trim();
            if trimmed.is_empty() {
                let message = "mounts.types entries must be non-empty";
                return Err(ConfigError::Invalid(message.to_string()));
            }
            if !seen.insert(trimmed) {
                return Err(ConfigError::Invalid(format!(
                    "mount '{}': type '{trimmed}' listed twice",
                    display_prefix(&self.prefix)
                )));
            }
        }
        Ok(())
    }

    /// Returns the discovery type selection for this mount.
    #[must_use]
    pub fn selection(&self) -> TypeSelection {
        let types: Vec<TypeName> =
            self.types.iter().map(|name| TypeName::new(name.trim())).collect();
        TypeSelection::from_flags(self.auto_discover, &types)
    }

    /// Returns the discovery mount options for this mount.
    #[must_use]
    pub fn mount_options(&self) -> MountOptions {
        MountOptions::new(self.prefix.clone())
    }
}

/// Route name override for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Registered type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Route name replacing the lowercase type name.
    #[serde(default)]
    pub route_name: Option<String>,
}

impl ResourceConfig {
    /// Validates the override.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.type_name.trim().is_empty() {
            return Err(ConfigError::Invalid("resources.type must be non-empty".to_string()));
        }
        if let Some(route_name) = &self.route_name {
            let trimmed = route_name.trim();
            let single_segment = !trimmed.is_empty()
                && !trimmed.contains('/')
                && normalize_prefix(trimmed).is_ok_and(|prefix| prefix == format!("/{trimmed}"));
            if !single_segment {
                return Err(ConfigError::Invalid(format!(
                    "resources.route_name '{route_name}' for type '{}' must be a single path \
                     segment",
                    self.type_name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Renders a normalized prefix for messages.
fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() { "/" } else { prefix }
}

/// Default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Default maximum request body size in bytes.
pub(crate) const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default `tiny_http` worker count.
pub(crate) const fn default_workers() -> usize {
    4
}

/// Mounts auto-discover by default.
pub(crate) const fn default_auto_discover() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
