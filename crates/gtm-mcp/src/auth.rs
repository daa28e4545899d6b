// crates/gtm-mcp/src/auth.rs
// ============================================================================
// Module: GTM Access Token
// Description: Resolution of the bearer token used for GTM API calls.
// Purpose: Load an OAuth access token from a file or environment variable.
// Dependencies: gtm-config, thiserror
// ============================================================================

//! ## Overview
//! OAuth flows run outside this process. The server only consumes an access
//! token: `auth.access_token_file` takes precedence, otherwise the variable
//! named by `auth.access_token_env` is read. Tokens are trimmed and must be
//! non-empty. Token values never appear in error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use gtm_config::AuthConfig;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum token file size in bytes.
const MAX_TOKEN_FILE_BYTES: u64 = 64 * 1024;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the access token using the process environment.
///
/// # Errors
///
/// Returns [`AuthError`] when no usable token is configured.
pub fn load_access_token(config: &AuthConfig) -> Result<String, AuthError> {
    resolve_access_token(config, |name| std::env::var(name).ok())
}

/// Resolves the access token with an injectable environment lookup.
///
/// # Errors
///
/// Returns [`AuthError`] when the token file cannot be read, the variable is
/// unset, or the token is blank.
pub fn resolve_access_token<F>(config: &AuthConfig, env_lookup: F) -> Result<String, AuthError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = &config.access_token_file {
        let token = read_token_file(Path::new(path))?;
        return non_blank(token, path);
    }
    let token = env_lookup(&config.access_token_env)
        .ok_or_else(|| AuthError::Missing(config.access_token_env.clone()))?;
    non_blank(token, &config.access_token_env)
}

/// Reads a token file while enforcing the size limit.
fn read_token_file(path: &Path) -> Result<String, AuthError> {
    let display = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|err| AuthError::Io(format!("{display}: {err}")))?;
    if metadata.len() > MAX_TOKEN_FILE_BYTES {
        return Err(AuthError::Io(format!("{display}: token file too large")));
    }
    fs::read_to_string(path).map_err(|err| AuthError::Io(format!("{display}: {err}")))
}

/// Trims the token and rejects blank values.
fn non_blank(token: String, source: &str) -> Result<String, AuthError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Empty(source.to_string()));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Access token resolution errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The token environment variable is unset.
    #[error("access token env var {0} is not set")]
    Missing(String),
    /// The token file could not be read.
    #[error("access token file error: {0}")]
    Io(String),
    /// The token source is blank.
    #[error("access token from {0} is empty")]
    Empty(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
