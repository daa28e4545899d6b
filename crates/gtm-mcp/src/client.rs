// crates/gtm-mcp/src/client.rs
// ============================================================================
// Module: GTM REST Client
// Description: Transport abstraction and typed operations for the GTM API.
// Purpose: Issue account-restricted Tag Manager API v2 calls.
// Dependencies: gtm-config, gtm-core, reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`GtmTransport`] executes one REST request and returns decoded JSON.
//! [`HttpGtmTransport`] implements it with a blocking `reqwest` client that
//! sends a bearer token, enforces a timeout, refuses redirects, and bounds the
//! response size. [`GtmApi`] layers the Tag Manager endpoints on top and
//! enforces the configured account restriction before any request leaves the
//! process.
//!
//! Security posture: resource paths are caller supplied. Every path-addressed
//! operation rejects dot segments, empty segments, and URL metacharacters,
//! then checks the `accounts/{id}` root against the restriction. The HTTP
//! transport refuses any URL whose resolved path differs from the requested
//! one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use gtm_config::GtmApiConfig;
use gtm_core::TagDraft;
use gtm_core::TriggerDraft;
use gtm_core::VariableDraft;
use gtm_core::VersionDraft;
use gtm_core::paths::account_id_from_path;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum GTM API response size accepted, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// HTTP verbs used by the Tag Manager API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the verb as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Converts to the `reqwest` method type.
    const fn to_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }
}

/// One Tag Manager API request, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Resource path, including any `:verb` suffix.
    pub path: String,
    /// Query string pairs.
    pub query: Vec<(String, String)>,
    /// JSON request body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Builds a bodiless request.
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Attaches a JSON body.
    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a query pair.
    fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Executes Tag Manager API requests.
pub trait GtmTransport: Send + Sync {
    /// Executes a request and returns the decoded JSON body.
    ///
    /// An empty success body decodes to [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on non-2xx status, transport failure, or
    /// undecodable responses.
    fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError>;
}

/// Errors returned by a [`GtmTransport`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the API.
        message: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response body was not valid JSON.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Blocking HTTP transport for the Tag Manager API.
pub struct HttpGtmTransport {
    /// HTTP client with timeout, user agent, and redirect policy applied.
    client: Client,
    /// API base URL, always ending with `/`.
    base_url: Url,
    /// OAuth access token sent as a bearer credential.
    access_token: String,
}

impl HttpGtmTransport {
    /// Creates a transport from `[gtm]` settings and an access token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &GtmApiConfig, access_token: String) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(&config.api_base_url)
            .map_err(|_| ApiError::Transport("invalid api base url".to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| ApiError::Transport("http client build failed".to_string()))?;
        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// Resolves a request path and query against the base URL.
    fn request_url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|_| ApiError::Transport("invalid request path".to_string()))?;
        if url.path() != format!("{}{}", self.base_url.path(), request.path)
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(ApiError::Transport("request path escapes api base url".to_string()));
        }
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl GtmTransport for HttpGtmTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let url = self.request_url(request)?;
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), url)
            .bearer_auth(&self.access_token);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let mut response =
            builder.send().map_err(|err| ApiError::Transport(err.without_url().to_string()))?;
        let status = response.status();
        let body = read_response_limited(&mut response, MAX_RESPONSE_BYTES)?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| ApiError::Transport("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(ApiError::Transport("response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|_| ApiError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(ApiError::Transport("response exceeds size limit".to_string()));
    }
    Ok(buf)
}

/// Extracts the API error message from a failure body.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body)
        && let Some(message) = value.pointer("/error/message").and_then(Value::as_str)
    {
        return message.to_string();
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        text
    }
}

// ============================================================================
// SECTION: API Operations
// ============================================================================

/// Errors returned by [`GtmApi`] operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The target account is outside the configured restriction.
    #[error("{0}")]
    Permission(String),
    /// The resource path is not rooted at `accounts/{id}`.
    #[error("Invalid GTM path format: {0}")]
    InvalidPath(String),
    /// The container has no published version.
    #[error(
        "No published version found for container {0}. Publish a version first using \
         gtm_publish_container."
    )]
    NoLiveVersion(String),
    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(String),
    /// The API call failed.
    #[error("Failed to {operation}: {source}")]
    Api {
        /// Operation label, e.g. `list tags`.
        operation: &'static str,
        /// Underlying transport error.
        source: ApiError,
    },
}

/// Tag Manager API v2 operations over a [`GtmTransport`].
#[derive(Clone)]
pub struct GtmApi {
    /// Request executor.
    transport: Arc<dyn GtmTransport>,
    /// Account every call is restricted to, when configured.
    restricted_account: Option<String>,
}

impl GtmApi {
    /// Creates an API facade with an optional account restriction.
    #[must_use]
    pub fn new(transport: Arc<dyn GtmTransport>, restricted_account: Option<String>) -> Self {
        Self {
            transport,
            restricted_account,
        }
    }

    /// Returns the configured account restriction.
    #[must_use]
    pub fn restricted_account(&self) -> Option<&str> {
        self.restricted_account.as_deref()
    }

    /// Checks an account id against the restriction.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Permission`] naming both ids on mismatch.
    pub fn validate_account_access(&self, account_id: &str) -> Result<(), ClientError> {
        match &self.restricted_account {
            Some(restricted) if restricted != account_id => Err(ClientError::Permission(format!(
                "Access denied: This GTM MCP instance is restricted to account ID {restricted}. \
                 Requested account: {account_id}"
            ))),
            _ => Ok(()),
        }
    }

    /// Checks the account root of a resource path against the restriction.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidPath`] when the path has segments that
    /// URL resolution would rewrite, or [`ClientError::Permission`].
    pub fn validate_path_access(&self, path: &str) -> Result<(), ClientError> {
        if !has_plain_segments(path) {
            return Err(ClientError::InvalidPath(path.to_string()));
        }
        let account_id =
            account_id_from_path(path).map_err(|_| ClientError::InvalidPath(path.to_string()))?;
        self.validate_account_access(&account_id)
    }

    /// Lists accessible accounts, filtered to the restricted account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on API failure or when the restricted account
    /// is not accessible.
    pub fn list_accounts(&self) -> Result<Vec<Value>, ClientError> {
        let response = self.call("list accounts", ApiRequest::new(HttpMethod::Get, "accounts"))?;
        let accounts = list_field(&response, "account");
        let Some(restricted) = &self.restricted_account else {
            return Ok(accounts);
        };
        let filtered: Vec<Value> = accounts
            .into_iter()
            .filter(|account| account.get("accountId").and_then(Value::as_str) == Some(restricted))
            .collect();
        if filtered.is_empty() {
            return Err(ClientError::Permission(format!(
                "Account ID {restricted} not found in accessible accounts. Please verify the \
                 account ID and your OAuth permissions."
            )));
        }
        Ok(filtered)
    }

    /// Lists containers in an account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn list_containers(&self, account_id: &str) -> Result<Vec<Value>, ClientError> {
        self.validate_account_access(account_id)?;
        self.validate_path_access(&format!("accounts/{account_id}"))?;
        let request = ApiRequest::new(HttpMethod::Get, format!("accounts/{account_id}/containers"));
        Ok(list_field(&self.call("list containers", request)?, "container"))
    }

    /// Lists workspaces in a container.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn list_workspaces(&self, container_path: &str) -> Result<Vec<Value>, ClientError> {
        self.list_collection("list workspaces", container_path, "workspaces", "workspace")
    }

    /// Lists tags in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn list_tags(&self, workspace_path: &str) -> Result<Vec<Value>, ClientError> {
        self.list_collection("list tags", workspace_path, "tags", "tag")
    }

    /// Fetches one tag.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn get_tag(&self, tag_path: &str) -> Result<Value, ClientError> {
        self.get_entity("get tag", tag_path)
    }

    /// Creates a tag in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction, encoding, or API failure.
    pub fn create_tag(&self, workspace_path: &str, tag: &TagDraft) -> Result<Value, ClientError> {
        self.create_entity("create tag", workspace_path, "tags", tag)
    }

    /// Replaces a tag with caller-supplied data.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn update_tag(&self, tag_path: &str, tag: &Value) -> Result<Value, ClientError> {
        self.put_entity("update tag", tag_path, tag)
    }

    /// Lists triggers in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn list_triggers(&self, workspace_path: &str) -> Result<Vec<Value>, ClientError> {
        self.list_collection("list triggers", workspace_path, "triggers", "trigger")
    }

    /// Creates a trigger in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction, encoding, or API failure.
    pub fn create_trigger(
        &self,
        workspace_path: &str,
        trigger: &TriggerDraft,
    ) -> Result<Value, ClientError> {
        self.create_entity("create trigger", workspace_path, "triggers", trigger)
    }

    /// Lists variables in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn list_variables(&self, workspace_path: &str) -> Result<Vec<Value>, ClientError> {
        self.list_collection("list variables", workspace_path, "variables", "variable")
    }

    /// Fetches one variable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn get_variable(&self, variable_path: &str) -> Result<Value, ClientError> {
        self.get_entity("get variable", variable_path)
    }

    /// Creates a variable in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction, encoding, or API failure.
    pub fn create_variable(
        &self,
        workspace_path: &str,
        variable: &VariableDraft,
    ) -> Result<Value, ClientError> {
        self.create_entity("create variable", workspace_path, "variables", variable)
    }

    /// Creates a container version from a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction, encoding, or API failure.
    pub fn create_version(
        &self,
        workspace_path: &str,
        version: &VersionDraft,
    ) -> Result<Value, ClientError> {
        self.validate_path_access(workspace_path)?;
        let request = ApiRequest::new(HttpMethod::Post, format!("{workspace_path}:create_version"))
            .with_body(encode(version)?);
        self.call("create version", request)
    }

    /// Publishes a container version.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn publish_version(&self, version_path: &str) -> Result<Value, ClientError> {
        self.post_verb("publish version", version_path, "publish")
    }

    /// Lists version headers of a container.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn list_versions(
        &self,
        container_path: &str,
        include_deleted: bool,
    ) -> Result<Vec<Value>, ClientError> {
        self.validate_path_access(container_path)?;
        let request = ApiRequest::new(HttpMethod::Get, format!("{container_path}/version_headers"))
            .with_query("includeDeleted", include_deleted.to_string());
        Ok(list_field(&self.call("list versions", request)?, "containerVersionHeader"))
    }

    /// Fetches one container version.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn get_version(&self, version_path: &str) -> Result<Value, ClientError> {
        self.get_entity("get version", version_path)
    }

    /// Fetches the published version of a container.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoLiveVersion`] on 404, otherwise
    /// [`ClientError`] on restriction or API failure.
    pub fn get_live_version(&self, container_path: &str) -> Result<Value, ClientError> {
        self.validate_path_access(container_path)?;
        let request = ApiRequest::new(HttpMethod::Get, format!("{container_path}/versions:live"));
        match self.transport.execute(&request) {
            Ok(value) => Ok(value),
            Err(ApiError::Status {
                status: 404, ..
            }) => Err(ClientError::NoLiveVersion(container_path.to_string())),
            Err(source) => Err(ClientError::Api {
                operation: "get live version",
                source,
            }),
        }
    }

    /// Fetches the latest version header of a container.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn get_latest_version(&self, container_path: &str) -> Result<Value, ClientError> {
        self.validate_path_access(container_path)?;
        let request =
            ApiRequest::new(HttpMethod::Get, format!("{container_path}/version_headers:latest"));
        self.call("get latest version", request)
    }

    /// Deletes a container version.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn delete_version(&self, version_path: &str) -> Result<(), ClientError> {
        self.validate_path_access(version_path)?;
        self.call("delete version", ApiRequest::new(HttpMethod::Delete, version_path))?;
        Ok(())
    }

    /// Restores a deleted container version.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn undelete_version(&self, version_path: &str) -> Result<Value, ClientError> {
        self.post_verb("undelete version", version_path, "undelete")
    }

    /// Replaces a container version with caller-supplied data.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn update_version(&self, version_path: &str, version: &Value) -> Result<Value, ClientError> {
        self.put_entity("update version", version_path, version)
    }

    /// Marks a container version as the latest.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on restriction or API failure.
    pub fn set_latest_version(&self, version_path: &str) -> Result<Value, ClientError> {
        self.post_verb("set latest version", version_path, "set_latest")
    }

    /// Lists `{parent}/{collection}` and returns the `key` array.
    fn list_collection(
        &self,
        operation: &'static str,
        parent: &str,
        collection: &str,
        key: &str,
    ) -> Result<Vec<Value>, ClientError> {
        self.validate_path_access(parent)?;
        let request = ApiRequest::new(HttpMethod::Get, format!("{parent}/{collection}"));
        Ok(list_field(&self.call(operation, request)?, key))
    }

    /// GETs one entity by path.
    fn get_entity(&self, operation: &'static str, path: &str) -> Result<Value, ClientError> {
        self.validate_path_access(path)?;
        self.call(operation, ApiRequest::new(HttpMethod::Get, path))
    }

    /// POSTs an encoded draft to `{parent}/{collection}`.
    fn create_entity<T: Serialize>(
        &self,
        operation: &'static str,
        parent: &str,
        collection: &str,
        draft: &T,
    ) -> Result<Value, ClientError> {
        self.validate_path_access(parent)?;
        let request = ApiRequest::new(HttpMethod::Post, format!("{parent}/{collection}"))
            .with_body(encode(draft)?);
        self.call(operation, request)
    }

    /// PUTs a full entity body to its path.
    fn put_entity(
        &self,
        operation: &'static str,
        path: &str,
        body: &Value,
    ) -> Result<Value, ClientError> {
        self.validate_path_access(path)?;
        self.call(operation, ApiRequest::new(HttpMethod::Put, path).with_body(body.clone()))
    }

    /// POSTs a custom `:verb` on a resource.
    fn post_verb(
        &self,
        operation: &'static str,
        path: &str,
        verb: &str,
    ) -> Result<Value, ClientError> {
        self.validate_path_access(path)?;
        self.call(operation, ApiRequest::new(HttpMethod::Post, format!("{path}:{verb}")))
    }

    /// Executes a request and labels failures with the operation.
    fn call(&self, operation: &'static str, request: ApiRequest) -> Result<Value, ClientError> {
        self.transport.execute(&request).map_err(|source| ClientError::Api {
            operation,
            source,
        })
    }
}

/// Returns true when no segment is empty, a dot segment, or holds `%`, `?`, `#`, or `\`.
fn has_plain_segments(path: &str) -> bool {
    path.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !segment.contains(['%', '?', '#', '\\'])
    })
}

/// Encodes a draft as a JSON request body.
fn encode<T: Serialize>(draft: &T) -> Result<Value, ClientError> {
    serde_json::to_value(draft).map_err(|err| ClientError::Encode(err.to_string()))
}

/// Returns the array under `key`, or an empty list when absent.
fn list_field(response: &Value, key: &str) -> Vec<Value> {
    response.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
}
