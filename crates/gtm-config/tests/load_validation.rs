// crates/gtm-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards, overrides, and section rules.
// Purpose: Ensure config input handling is strict and fail-closed.
// ============================================================================

//! Config load validation tests for gtm-config.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::io::Write;
use std::path::Path;

use gtm_config::ConfigError;
use gtm_config::GtmMcpConfig;
use gtm_config::ServerTransport;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn no_env(_: &str) -> Option<String> {
    None
}

fn assert_invalid(result: Result<GtmMcpConfig, ConfigError>, needle: &str) -> TestResult {
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

fn write_config(contents: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(
        GtmMcpConfig::load_with_env(Some(Path::new(&long_path)), no_env),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        GtmMcpConfig::load_with_env(Some(Path::new(&long_component)), no_env),
        "config path component too long",
    )
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    assert_invalid(GtmMcpConfig::load_with_env(Some(&missing), no_env), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&vec![b'#'; 1_048_577]).map_err(|err| err.to_string())?;
    assert_invalid(
        GtmMcpConfig::load_with_env(Some(file.path()), no_env),
        "config file exceeds size limit",
    )
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(GtmMcpConfig::load_with_env(Some(file.path()), no_env), "config file must be utf-8")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config("[server\ntransport = ")?;
    assert_invalid(GtmMcpConfig::load_with_env(Some(file.path()), no_env), "config parse error")
}

#[test]
fn load_reads_every_section() -> TestResult {
    let file = write_config(
        r#"
[server]
transport = "http"
bind = "127.0.0.1:8088"
max_body_bytes = 65536

[gtm]
api_base_url = "http://127.0.0.1:9000/tagmanager/v2/"
timeout_ms = 5000
user_agent = "tests/1.0"
account_id = "1234567890"

[auth]
access_token_env = "TEST_GTM_TOKEN"

[audit]
enabled = false
log_arguments = true
"#,
    )?;
    let config = GtmMcpConfig::load_with_env(Some(file.path()), no_env).map_err(|err| err.to_string())?;
    assert_eq!(config.server.transport, ServerTransport::Http);
    assert_eq!(config.server.bind_addr().unwrap().port(), 8088);
    assert_eq!(config.gtm.timeout_ms, 5000);
    assert_eq!(config.account_restriction(), Some("1234567890"));
    assert_eq!(config.auth.access_token_env, "TEST_GTM_TOKEN");
    assert!(!config.audit.enabled);
    assert!(config.audit.log_arguments);
    Ok(())
}

#[test]
fn env_path_is_used_when_no_flag_given() -> TestResult {
    let file = write_config("[gtm]\ntimeout_ms = 2500\n")?;
    let path = file.path().to_string_lossy().into_owned();
    let config = GtmMcpConfig::load_with_env(None, |key| (key == "GTM_MCP_CONFIG").then(|| path.clone()))
        .map_err(|err| err.to_string())?;
    assert_eq!(config.gtm.timeout_ms, 2500);
    Ok(())
}

#[test]
fn account_env_overrides_file_and_is_validated() -> TestResult {
    let file = write_config("[gtm]\naccount_id = \"1234567890\"\n")?;
    let config = GtmMcpConfig::load_with_env(Some(file.path()), |key| {
        (key == "GTM_ACCOUNT_ID").then(|| " 9876543210 ".to_string())
    })
    .map_err(|err| err.to_string())?;
    assert_eq!(config.account_restriction(), Some("9876543210"));

    let blank = GtmMcpConfig::load_with_env(Some(file.path()), |key| {
        (key == "GTM_ACCOUNT_ID").then(|| "  ".to_string())
    })
    .map_err(|err| err.to_string())?;
    assert_eq!(blank.account_restriction(), Some("1234567890"));

    assert_invalid(
        GtmMcpConfig::load_with_env(Some(file.path()), |key| {
            (key == "GTM_ACCOUNT_ID").then(|| "42".to_string())
        }),
        "Account ID must be at least 10 digits",
    )
}

#[test]
fn http_transport_requires_bind() -> TestResult {
    assert_invalid(
        GtmMcpConfig::from_toml_str("[server]\ntransport = \"http\"\n"),
        "http transport requires bind address",
    )?;
    assert_invalid(
        GtmMcpConfig::from_toml_str("[server]\ntransport = \"http\"\nbind = \"localhost\"\n"),
        "invalid bind address",
    )
}

#[test]
fn numeric_ranges_are_enforced() -> TestResult {
    assert_invalid(
        GtmMcpConfig::from_toml_str("[server]\nmax_body_bytes = 10\n"),
        "server.max_body_bytes must be between",
    )?;
    assert_invalid(
        GtmMcpConfig::from_toml_str("[gtm]\ntimeout_ms = 50\n"),
        "gtm.timeout_ms must be between",
    )?;
    assert_invalid(
        GtmMcpConfig::from_toml_str("[gtm]\ntimeout_ms = 120001\n"),
        "gtm.timeout_ms must be between",
    )
}

#[test]
fn remote_http_base_url_is_rejected() -> TestResult {
    assert_invalid(
        GtmMcpConfig::from_toml_str("[gtm]\napi_base_url = \"http://tagmanager.example.com/\"\n"),
        "must use https",
    )
}

#[test]
fn auth_and_audit_paths_are_checked() -> TestResult {
    assert_invalid(
        GtmMcpConfig::from_toml_str("[auth]\naccess_token_env = \"BAD-NAME\"\n"),
        "auth.access_token_env must be an environment variable name",
    )?;
    assert_invalid(
        GtmMcpConfig::from_toml_str("[audit]\npath = \"  \"\n"),
        "audit.path must be non-empty",
    )
}

#[test]
fn unknown_transport_fails_to_parse() -> TestResult {
    assert_invalid(GtmMcpConfig::from_toml_str("[server]\ntransport = \"sse\"\n"), "config parse error")
}
