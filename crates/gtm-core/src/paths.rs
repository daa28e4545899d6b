// crates/gtm-core/src/paths.rs
// ============================================================================
// Module: GTM Resource Paths
// Description: Formatting and parsing of GTM REST resource paths.
// Purpose: Keep resource identifiers bit-exact for the REST client.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! GTM resources are addressed by slash-delimited `{collection}/{id}` paths
//! rooted at `accounts/{accountId}`. The REST client uses these strings
//! verbatim, so formatting here must match GTM's grammar exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::errors::ParameterFormatError;

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats `accounts/{a}/containers/{c}`.
#[must_use]
pub fn container_path(account_id: &str, container_id: &str) -> String {
    format!("accounts/{account_id}/containers/{container_id}")
}

/// Formats `accounts/{a}/containers/{c}/workspaces/{w}`.
#[must_use]
pub fn workspace_path(account_id: &str, container_id: &str, workspace_id: &str) -> String {
    format!("accounts/{account_id}/containers/{container_id}/workspaces/{workspace_id}")
}

/// Formats `accounts/{a}/containers/{c}/versions/{v}`.
#[must_use]
pub fn version_path(account_id: &str, container_id: &str, version_id: &str) -> String {
    format!("accounts/{account_id}/containers/{container_id}/versions/{version_id}")
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Returns the segment following the pluralized `resource_type` segment.
///
/// # Errors
///
/// Returns [`ParameterFormatError`] when the plural segment is missing or is
/// the last segment.
pub fn extract_id_from_path(path: &str, resource_type: &str) -> Result<String, ParameterFormatError> {
    let plural = format!("{resource_type}s");
    let mut segments = path.split('/');
    let found = segments.by_ref().any(|segment| segment == plural);
    match segments.next() {
        Some(id) if found => Ok(id.to_string()),
        _ => Err(ParameterFormatError::new(format!("Could not extract {resource_type} ID from path"))
            .with_parameter_key("path")
            .with_expected_structure(format!(".../{resource_type}s/{{id}}/..."))),
    }
}

/// Returns the account id of a path rooted at `accounts/{id}`.
///
/// # Errors
///
/// Returns [`ParameterFormatError`] when the path is not rooted at `accounts`
/// or has no account segment.
pub fn account_id_from_path(path: &str) -> Result<String, ParameterFormatError> {
    let mut segments = path.split('/');
    match (segments.next(), segments.next()) {
        (Some("accounts"), Some(account_id)) if !account_id.is_empty() => Ok(account_id.to_string()),
        _ => Err(ParameterFormatError::new("Could not extract account ID from path")
            .with_parameter_key("path")
            .with_expected_structure("accounts/{accountId}/...")),
    }
}

/// Parsed workspace path components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspacePath {
    /// Account identifier.
    pub account_id: String,
    /// Container identifier.
    pub container_id: String,
    /// Workspace identifier.
    pub workspace_id: String,
}

impl WorkspacePath {
    /// Parses `accounts/{a}/containers/{c}/workspaces/{w}`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterFormatError`] unless the path has exactly six
    /// segments in that layout.
    pub fn parse(path: &str) -> Result<Self, ParameterFormatError> {
        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["accounts", account_id, "containers", container_id, "workspaces", workspace_id] => {
                Ok(Self {
                    account_id: (*account_id).to_string(),
                    container_id: (*container_id).to_string(),
                    workspace_id: (*workspace_id).to_string(),
                })
            }
            _ => Err(ParameterFormatError::new("Invalid workspace path format")
                .with_parameter_key("path")
                .with_expected_structure(
                    "accounts/{accountId}/containers/{containerId}/workspaces/{workspaceId}",
                )),
        }
    }

    /// Returns the container path this workspace belongs to.
    #[must_use]
    pub fn container_path(&self) -> String {
        container_path(&self.account_id, &self.container_id)
    }

    /// Formats the canonical workspace path.
    #[must_use]
    pub fn as_path(&self) -> String {
        workspace_path(&self.account_id, &self.container_id, &self.workspace_id)
    }
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path())
    }
}

/// Parses a workspace path into its components.
///
/// # Errors
///
/// Returns [`ParameterFormatError`] as [`WorkspacePath::parse`] does.
pub fn parse_workspace_path(path: &str) -> Result<WorkspacePath, ParameterFormatError> {
    WorkspacePath::parse(path)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
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
        reason = "Test-only path assertions."
    )]

    use super::WorkspacePath;
    use super::account_id_from_path;
    use super::extract_id_from_path;
    use super::parse_workspace_path;

    #[test]
    fn workspace_path_round_trips_through_display() {
        let path = "accounts/123456/containers/789012/workspaces/5";
        let parsed = WorkspacePath::parse(path).unwrap();
        assert_eq!(parsed.to_string(), path);
        assert_eq!(parsed.container_path(), "accounts/123456/containers/789012");
    }

    #[test]
    fn workspace_path_rejects_wrong_collection_names() {
        assert!(WorkspacePath::parse("accounts/1/folders/2/workspaces/3").is_err());
    }

    #[test]
    fn workspace_path_rejects_container_path() {
        let err = WorkspacePath::parse("accounts/123/containers/456").unwrap_err();
        assert_eq!(err.message, "Invalid workspace path format");
        assert!(parse_workspace_path("accounts/1/containers/2/workspaces/3/tags").is_err());
    }

    #[test]
    fn extract_id_returns_segment_after_plural() {
        let path = "accounts/123/containers/456/workspaces/5";
        assert_eq!(extract_id_from_path(path, "workspace").unwrap(), "5");
        assert_eq!(extract_id_from_path(path, "container").unwrap(), "456");
        assert_eq!(extract_id_from_path(path, "account").unwrap(), "123");
    }

    #[test]
    fn extract_id_requires_plural_segment() {
        let err = extract_id_from_path("accounts/123/containers/456", "tag").unwrap_err();
        assert_eq!(err.message, "Could not extract tag ID from path");
        assert_eq!(err.parameter_key.as_deref(), Some("path"));
    }

    #[test]
    fn extract_id_rejects_trailing_plural_segment() {
        let err = extract_id_from_path("accounts/1/containers", "container").unwrap_err();
        assert_eq!(err.message, "Could not extract container ID from path");
    }

    #[test]
    fn account_id_requires_accounts_root() {
        assert_eq!(account_id_from_path("accounts/42/containers/7").unwrap(), "42");
        assert!(account_id_from_path("containers/42").is_err());
        assert!(account_id_from_path("accounts/").is_err());
    }
}
