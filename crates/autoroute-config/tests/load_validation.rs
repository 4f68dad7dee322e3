//! Config load validation tests for autoroute-config.
// crates/autoroute-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use autoroute_config::AutorouteConfig;
use autoroute_config::ConfigError;
use autoroute_config::ServerBackend;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<AutorouteConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(AutorouteConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(AutorouteConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("missing.toml");
    assert_invalid(AutorouteConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(AutorouteConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(AutorouteConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"[server\nbind = ")?;
    assert_invalid(AutorouteConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_runs_validation() -> TestResult {
    let file = write_config(b"[server]\nworkers = 0\n")?;
    assert_invalid(AutorouteConfig::load(Some(file.path())), "workers must be between")?;
    Ok(())
}

#[test]
fn load_accepts_valid_file_and_normalizes_prefixes() -> TestResult {
    let file = write_config(
        b"[server]\nbackend = \"tiny_http\"\nbind = \"127.0.0.1:0\"\n\n\
          [[mounts]]\nprefix = \"api/\"\n",
    )?;
    let config = AutorouteConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.server.backend != ServerBackend::TinyHttp {
        return Err("expected tiny_http backend".to_string());
    }
    if config.mounts[0].prefix != "/api" {
        return Err(format!("prefix not normalized: {}", config.mounts[0].prefix));
    }
    let addr = config.bind_addr().map_err(|err| err.to_string())?;
    if addr.port() != 0 {
        return Err(format!("unexpected bind {addr}"));
    }
    Ok(())
}
