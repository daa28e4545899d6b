// crates/gtm-config/src/config.rs
// ============================================================================
// Module: GTM MCP Configuration
// Description: Configuration loading and validation for the GTM MCP server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: gtm-core, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! An explicitly named file must exist; when no file is named and the default
//! file is absent, built-in defaults apply. Environment overrides are applied
//! after parsing and before validation, so overridden values are validated
//! too.
//!
//! Security posture: config inputs are untrusted; invalid values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use gtm_core::validation::validate_account_id;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Host;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "gtm-mcp.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "GTM_MCP_CONFIG";
/// Environment variable that overrides `gtm.account_id`.
pub const ACCOUNT_ID_ENV_VAR: &str = "GTM_ACCOUNT_ID";
/// Default environment variable holding the GTM access token.
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "GTM_ACCESS_TOKEN";
/// Default GTM REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://tagmanager.googleapis.com/tagmanager/v2/";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Smallest accepted request body limit.
pub(crate) const MIN_BODY_BYTES: usize = 1024;
/// Largest accepted request body limit.
pub(crate) const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
/// Smallest accepted GTM API timeout.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Largest accepted GTM API timeout.
pub(crate) const MAX_TIMEOUT_MS: u64 = 120_000;
/// Maximum user agent length.
pub(crate) const MAX_USER_AGENT_LENGTH: usize = 256;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// GTM MCP server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GtmMcpConfig {
    /// Server transport configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// GTM REST API client configuration.
    #[serde(default)]
    pub gtm: GtmApiConfig,
    /// Access token sourcing.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl GtmMcpConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration with an injected environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, env_lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match resolve_path(path, &env_lookup)? {
            Some(resolved) => {
                validate_path(&resolved)?;
                let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
                if bytes.len() > MAX_CONFIG_FILE_SIZE {
                    return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
                }
                let content = std::str::from_utf8(&bytes)
                    .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
                toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(&env_lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text without overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.gtm.validate()?;
        self.auth.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the account every call is restricted to, if any.
    #[must_use]
    pub fn account_restriction(&self) -> Option<&str> {
        self.gtm.account_id.as_deref()
    }

    /// Applies environment overrides.
    fn apply_env_overrides<F>(&mut self, env_lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(account_id) = env_lookup(ACCOUNT_ID_ENV_VAR)
            && !account_id.trim().is_empty()
        {
            self.gtm.account_id = Some(account_id.trim().to_string());
        }
    }
}

// ============================================================================
// SECTION: Server Config
// ============================================================================

/// Supported MCP transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// Use stdin/stdout transport.
    #[default]
    Stdio,
    /// Use HTTP JSON-RPC transport.
    Http,
}

impl ServerTransport {
    /// Returns the config spelling of the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport type for MCP.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address for the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bind address is missing or invalid.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self.bind.as_deref().unwrap_or_default().trim();
        if bind.is_empty() {
            return Err(ConfigError::Invalid("http transport requires bind address".to_string()));
        }
        bind.parse().map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))
    }

    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BODY_BYTES ..= MAX_BODY_BYTES).contains(&self.max_body_bytes) {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between {MIN_BODY_BYTES} and {MAX_BODY_BYTES}"
            )));
        }
        if self.transport == ServerTransport::Http {
            self.bind_addr()?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: GTM API Config
// ============================================================================

/// GTM REST API client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GtmApiConfig {
    /// Base URL of the Tag Manager v2 API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Restricts every call to this account when set.
    #[serde(default)]
    pub account_id: Option<String>,
}

impl Default for GtmApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            account_id: None,
        }
    }
}

impl GtmApiConfig {
    /// Validates API client configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "gtm.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        let user_agent = self.user_agent.trim();
        if user_agent.is_empty() || user_agent.len() > MAX_USER_AGENT_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "gtm.user_agent must be 1-{MAX_USER_AGENT_LENGTH} characters"
            )));
        }
        validate_base_url(&self.api_base_url)?;
        if let Some(account_id) = &self.account_id {
            validate_account_id(account_id)
                .map_err(|err| ConfigError::Invalid(format!("gtm.account_id: {err}")))?;
        }
        Ok(())
    }
}

/// Requires https, or http for loopback hosts only.
fn validate_base_url(value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("gtm.api_base_url is invalid: {err}")))?;
    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback_host(url.host()) => Ok(()),
        "http" => Err(ConfigError::Invalid(
            "gtm.api_base_url must use https for non-loopback hosts".to_string(),
        )),
        other => Err(ConfigError::Invalid(format!("gtm.api_base_url scheme {other} unsupported"))),
    }
}

/// Returns true for localhost and loopback addresses.
fn is_loopback_host(host: Option<Host<&str>>) -> bool {
    match host {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(addr)) => IpAddr::V4(addr).is_loopback(),
        Some(Host::Ipv6(addr)) => IpAddr::V6(addr).is_loopback(),
        None => false,
    }
}

// ============================================================================
// SECTION: Auth Config
// ============================================================================

/// Access token sourcing for outbound GTM calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the access token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
    /// Optional file holding the access token; takes precedence over the env var.
    #[serde(default)]
    pub access_token_file: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_env: default_access_token_env(),
            access_token_file: None,
        }
    }
}

impl AuthConfig {
    /// Validates access token sourcing.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = self.access_token_env.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("auth.access_token_env must be non-empty".to_string()));
        }
        if !name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_') {
            return Err(ConfigError::Invalid(
                "auth.access_token_env must be an environment variable name".to_string(),
            ));
        }
        if let Some(path) = &self.access_token_file {
            validate_path_string("auth.access_token_file", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Config
// ============================================================================

/// Audit logging configuration for MCP server requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Include tool arguments in audit events (explicit opt-in).
    #[serde(default)]
    pub log_arguments: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
            log_arguments: false,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
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

/// Resolves the config path from CLI, environment, or the default file.
///
/// Returns `None` when nothing names a file and the default file is absent.
fn resolve_path<F>(path: Option<&Path>, env_lookup: &F) -> Result<Option<PathBuf>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Some(env_path) = env_lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default_path = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default_path.is_file().then_some(default_path))
}

/// Validates the resolved path against security limits.
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
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default maximum request body size in bytes.
pub(crate) const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default GTM API base URL.
fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

/// Default GTM API timeout in milliseconds.
pub(crate) const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default user agent.
fn default_user_agent() -> String {
    format!("gtm-mcp/{}", env!("CARGO_PKG_VERSION"))
}

/// Default access token environment variable.
fn default_access_token_env() -> String {
    DEFAULT_ACCESS_TOKEN_ENV.to_string()
}

/// Audit logging is on unless disabled.
pub(crate) const fn default_audit_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================
