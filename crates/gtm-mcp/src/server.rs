// crates/gtm-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC 2.0 server over stdio and HTTP transports.
// Purpose: Expose GTM tools to MCP clients.
// Dependencies: gtm-config, axum, tokio, serde_json
// ============================================================================

//! ## Overview
//! The MCP server answers `initialize`, `tools/list`, `tools/call`, and
//! `ping`, routing tool calls through [`crate::tools::ToolRouter`].
//! Notifications (requests without an `id`) are accepted and never answered.
//!
//! The stdio transport accepts both `Content-Length` framed messages and
//! newline-delimited JSON, detected per message, and replies in the framing
//! the request used. The HTTP transport serves `POST /rpc`.
//!
//! Every answered request is recorded through [`McpAuditSink`].
//! Security posture: request bodies are untrusted and size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use gtm_config::GtmMcpConfig;
use gtm_config::ServerConfig;
use gtm_config::ServerTransport;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditEventParams;
use crate::audit::McpAuditSink;
use crate::audit::sink_from_config;
use crate::auth::load_access_token;
use crate::client::GtmApi;
use crate::client::HttpGtmTransport;
use crate::telemetry::McpMethod;
use crate::telemetry::McpOutcome;
use crate::tooling::ToolDefinition;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MCP protocol revision reported when the client does not request one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
/// Server name reported by `initialize`.
const SERVER_NAME: &str = "gtm-mcp";
/// Maximum length of one stdio header line.
const MAX_HEADER_LINE_BYTES: u64 = 8 * 1024;
/// Fallback body when a response cannot be serialized.
const SERIALIZATION_FAILURE_BODY: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32060,"message":"serialization failed"}}"#;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: GtmMcpConfig,
    /// Shared request handling state.
    state: Arc<ServerState>,
}

impl McpServer {
    /// Builds a server from validated configuration.
    ///
    /// Resolves the access token, builds the HTTP transport, and opens the
    /// audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when configuration or initialization fails.
    pub fn from_config(config: GtmMcpConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let token =
            load_access_token(&config.auth).map_err(|err| McpServerError::Init(err.to_string()))?;
        let transport = HttpGtmTransport::new(&config.gtm, token)
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let api = GtmApi::new(Arc::new(transport), config.account_restriction().map(str::to_string));
        let audit = sink_from_config(&config.audit)
            .map_err(|err| McpServerError::Init(format!("audit sink: {err}")))?;
        emit_bind_warning(&config.server);
        Ok(Self::new(config, ToolRouter::new(api), audit))
    }

    /// Builds a server from prepared components.
    #[must_use]
    pub fn new(config: GtmMcpConfig, router: ToolRouter, audit: Arc<dyn McpAuditSink>) -> Self {
        let state = Arc::new(ServerState {
            router,
            audit,
            max_body_bytes: config.server.max_body_bytes,
            log_arguments: config.audit.log_arguments,
        });
        Self {
            config,
            state,
        }
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the transport fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => {
                let state = Arc::clone(&self.state);
                tokio::task::spawn_blocking(move || serve_stdio(&state))
                    .await
                    .map_err(|_| McpServerError::Transport("stdio task failed".to_string()))?
            }
            ServerTransport::Http => {
                let addr = self
                    .config
                    .server
                    .bind_addr()
                    .map_err(|err| McpServerError::Config(err.to_string()))?;
                serve_http(addr, self.state).await
            }
        }
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Shared request handling state.
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Audit sink for request events.
    audit: Arc<dyn McpAuditSink>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
    /// Whether tool arguments are included in audit events.
    log_arguments: bool,
}

/// Transport details of one request.
#[derive(Debug, Clone, Copy)]
struct RequestContext {
    /// Transport that carried the request.
    transport: ServerTransport,
    /// Peer address for HTTP requests.
    peer_ip: Option<IpAddr>,
}

impl RequestContext {
    /// Context for stdio requests.
    const fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            peer_ip: None,
        }
    }

    /// Context for HTTP requests.
    const fn http(peer: SocketAddr) -> Self {
        Self {
            transport: ServerTransport::Http,
            peer_ip: Some(peer.ip()),
        }
    }
}

/// Audit labels collected while handling one request.
struct RequestLabels {
    /// JSON-RPC request id rendered as text.
    request_id: Option<String>,
    /// Method classification.
    method: McpMethod,
    /// Tool name for tools/call.
    tool: Option<String>,
    /// Tool arguments when argument logging is enabled.
    arguments: Option<Value>,
}

impl RequestLabels {
    /// Labels for a request that could not be parsed.
    const fn invalid() -> Self {
        Self {
            request_id: None,
            method: McpMethod::Invalid,
            tool: None,
            arguments: None,
        }
    }
}

impl ServerState {
    /// Handles one raw JSON-RPC message.
    ///
    /// Returns `None` for notifications, otherwise the HTTP status and the
    /// serialized response body.
    fn handle_payload(&self, bytes: &[u8], context: RequestContext) -> Option<(StatusCode, Vec<u8>)> {
        if bytes.len() > self.max_body_bytes {
            return Some(self.finish(context, bytes.len(), RequestLabels::invalid(), too_large()));
        }
        let Ok(request) = serde_json::from_slice::<JsonRpcRequest>(bytes) else {
            let response = error_response(
                StatusCode::BAD_REQUEST,
                Value::Null,
                -32600,
                "invalid json-rpc request".to_string(),
                None,
            );
            return Some(self.finish(context, bytes.len(), RequestLabels::invalid(), response));
        };
        let id = request.id.clone()?;
        let labels = self.labels(&request, &id);
        let response = handle_request(&self.router, request, id);
        Some(self.finish(context, bytes.len(), labels, response))
    }

    /// Handles a stdio message that exceeded the body limit.
    fn handle_oversized(&self, context: RequestContext, request_bytes: usize) -> Vec<u8> {
        self.finish(context, request_bytes, RequestLabels::invalid(), too_large()).1
    }

    /// Extracts audit labels from a parsed request.
    fn labels(&self, request: &JsonRpcRequest, id: &Value) -> RequestLabels {
        let method = McpMethod::from_method(&request.method);
        let params = request.params.as_ref().filter(|_| method == McpMethod::ToolsCall);
        RequestLabels {
            request_id: Some(id.to_string()),
            method,
            tool: params
                .and_then(|params| params.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            arguments: params
                .filter(|_| self.log_arguments)
                .and_then(|params| params.get("arguments"))
                .cloned(),
        }
    }

    /// Serializes a response and records the audit event.
    fn finish(
        &self,
        context: RequestContext,
        request_bytes: usize,
        labels: RequestLabels,
        response: (StatusCode, JsonRpcResponse),
    ) -> (StatusCode, Vec<u8>) {
        let (status, response) = response;
        let error_code = response.error.as_ref().map(|error| error.code);
        let body = serde_json::to_vec(&response)
            .unwrap_or_else(|_| SERIALIZATION_FAILURE_BODY.to_vec());
        let event = McpAuditEvent::new(McpAuditEventParams {
            request_id: labels.request_id,
            transport: context.transport,
            peer_ip: context.peer_ip.map(|ip| ip.to_string()),
            method: labels.method,
            tool: labels.tool,
            outcome: if error_code.is_some() { McpOutcome::Error } else { McpOutcome::Ok },
            error_code,
            request_bytes,
            response_bytes: body.len(),
            arguments: labels.arguments,
        });
        self.audit.record(&event);
        (status, body)
    }
}

/// Dispatches a parsed JSON-RPC request.
fn handle_request(
    router: &ToolRouter,
    request: JsonRpcRequest,
    id: Value,
) -> (StatusCode, JsonRpcResponse) {
    if request.jsonrpc != "2.0" {
        return error_response(
            StatusCode::BAD_REQUEST,
            id,
            -32600,
            "invalid json-rpc version".to_string(),
            None,
        );
    }
    match request.method.as_str() {
        "initialize" => {
            let requested = request
                .params
                .as_ref()
                .and_then(|params| params.get("protocolVersion"))
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_PROTOCOL_VERSION);
            success_response(
                id,
                json!({
                    "protocolVersion": requested,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
        }
        "ping" => success_response(id, json!({})),
        "tools/list" => match serde_json::to_value(ToolListResult {
            tools: router.list_tools(),
        }) {
            Ok(value) => success_response(id, value),
            Err(_) => jsonrpc_error(id, ToolError::Serialization),
        },
        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let Ok(call) = serde_json::from_value::<ToolCallParams>(params) else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    id,
                    -32602,
                    "invalid tool params".to_string(),
                    None,
                );
            };
            match router.handle_tool_call(&call.name, call.arguments) {
                Ok(result) => match tool_call_result(&result) {
                    Ok(value) => success_response(id, value),
                    Err(err) => jsonrpc_error(id, err),
                },
                Err(err) => jsonrpc_error(id, err),
            }
        }
        _ => error_response(StatusCode::BAD_REQUEST, id, -32601, "method not found".to_string(), None),
    }
}

/// Wraps a tool result as MCP text content.
fn tool_call_result(result: &Value) -> Result<Value, ToolError> {
    let text = serde_json::to_string_pretty(result).map_err(|_| ToolError::Serialization)?;
    serde_json::to_value(ToolCallResult {
        content: vec![ToolContent::Text {
            text,
        }],
    })
    .map_err(|_| ToolError::Serialization)
}

/// Builds a JSON-RPC error response for a tool failure.
fn jsonrpc_error(id: Value, error: ToolError) -> (StatusCode, JsonRpcResponse) {
    let data = error.data();
    let (status, code) = match &error {
        ToolError::UnknownTool(_) => (StatusCode::BAD_REQUEST, -32601),
        ToolError::InvalidParams(_) | ToolError::Validation(_) | ToolError::Structure(_) => {
            (StatusCode::BAD_REQUEST, -32602)
        }
        ToolError::Permission(_) => (StatusCode::FORBIDDEN, -32003),
        ToolError::Api(_) => (StatusCode::OK, -32020),
        ToolError::Internal(_) => (StatusCode::OK, -32050),
        ToolError::Serialization => (StatusCode::OK, -32060),
    };
    error_response(status, id, code, error.to_string(), data)
}

/// Builds a successful response.
fn success_response(id: Value, result: Value) -> (StatusCode, JsonRpcResponse) {
    (
        StatusCode::OK,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        },
    )
}

/// Builds an error response.
fn error_response(
    status: StatusCode,
    id: Value,
    code: i64,
    message: String,
    data: Option<Value>,
) -> (StatusCode, JsonRpcResponse) {
    (
        status,
        JsonRpcResponse {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        },
    )
}

/// Builds the response for an oversized request.
fn too_large() -> (StatusCode, JsonRpcResponse) {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        Value::Null,
        -32070,
        "request body too large".to_string(),
        None,
    )
}

// ============================================================================
// SECTION: JSON-RPC Types
// ============================================================================

/// JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC version.
    jsonrpc: String,
    /// Request identifier; absent for notifications.
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    /// Method name.
    method: String,
    /// Method parameters.
    #[serde(default)]
    params: Option<Value>,
}

/// Deserializes a present field, keeping an explicit `null` as `Some`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC response payload.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Error message.
    message: String,
    /// Structured validation detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Tool call parameters.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Tool arguments payload.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Pretty-printed JSON result as text.
    Text {
        /// Rendered result.
        text: String,
    },
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout until stdin closes.
fn serve_stdio(state: &ServerState) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(std::io::stdin());
    let mut writer = std::io::stdout();
    let context = RequestContext::stdio();
    while let Some(frame) = read_message(&mut reader, state.max_body_bytes)? {
        let body = match frame.inbound {
            Inbound::Message(bytes) => state.handle_payload(&bytes, context).map(|(_, body)| body),
            Inbound::TooLarge(len) => Some(state.handle_oversized(context, len)),
        };
        if let Some(body) = body {
            write_message(&mut writer, frame.framing, &body)?;
        }
    }
    Ok(())
}

/// Wire framing of one stdio message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    /// `Content-Length` header block followed by the payload.
    ContentLength,
    /// One JSON document per line.
    Line,
}

/// Payload of one stdio message.
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    /// Message within the size limit.
    Message(Vec<u8>),
    /// Message over the size limit, already discarded; carries its size.
    TooLarge(usize),
}

/// One stdio message with its framing.
#[derive(Debug)]
struct Frame {
    /// Framing the message arrived in.
    framing: Framing,
    /// Message payload.
    inbound: Inbound,
}

/// Reads one stdio message, detecting its framing.
///
/// Returns `None` at end of input.
fn read_message<R: BufRead>(reader: &mut R, max_body_bytes: usize) -> Result<Option<Frame>, McpServerError> {
    let line_limit =
        u64::try_from(max_body_bytes).unwrap_or(u64::MAX).saturating_add(2).max(MAX_HEADER_LINE_BYTES);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .by_ref()
            .take(line_limit)
            .read_until(b'\n', &mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        let truncated = !line.ends_with(b"\n") && u64::try_from(read).unwrap_or(u64::MAX) >= line_limit;
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with(b"{") || trimmed.starts_with(b"[") {
            if truncated {
                let skipped = reader
                    .skip_until(b'\n')
                    .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
                return Ok(Some(Frame {
                    framing: Framing::Line,
                    inbound: Inbound::TooLarge(read.saturating_add(skipped)),
                }));
            }
            let inbound = if trimmed.len() > max_body_bytes {
                Inbound::TooLarge(trimmed.len())
            } else {
                Inbound::Message(trimmed.to_vec())
            };
            return Ok(Some(Frame {
                framing: Framing::Line,
                inbound,
            }));
        }
        if truncated {
            return Err(McpServerError::Transport("header line too long".to_string()));
        }
        let first = String::from_utf8_lossy(&line).into_owned();
        let len = read_content_length(reader, &first)?;
        return read_framed_body(reader, len, max_body_bytes).map(|inbound| {
            Some(Frame {
                framing: Framing::ContentLength,
                inbound,
            })
        });
    }
}

/// Parses a header block whose first line is `first`.
fn read_content_length<R: BufRead>(reader: &mut R, first: &str) -> Result<usize, McpServerError> {
    let mut content_length = parse_content_length(first)?;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .by_ref()
            .take(MAX_HEADER_LINE_BYTES)
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            return Err(McpServerError::Transport("stdio closed".to_string()));
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(parsed) = parse_content_length(&line)? {
            content_length = Some(parsed);
        }
    }
    content_length.ok_or_else(|| McpServerError::Transport("missing content length".to_string()))
}

/// Parses a `Content-Length` header line; other headers yield `None`.
fn parse_content_length(line: &str) -> Result<Option<usize>, McpServerError> {
    let Some((name, value)) = line.split_once(':') else {
        return Err(McpServerError::Transport("invalid header line".to_string()));
    };
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return Ok(None);
    }
    value
        .trim()
        .parse::<usize>()
        .map(Some)
        .map_err(|_| McpServerError::Transport("invalid content length".to_string()))
}

/// Reads a framed payload of `len` bytes, discarding it when oversized.
fn read_framed_body<R: BufRead>(reader: &mut R, len: usize, max_body_bytes: usize) -> Result<Inbound, McpServerError> {
    if len > max_body_bytes {
        let len_u64 = u64::try_from(len)
            .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
        let skipped = std::io::copy(&mut reader.by_ref().take(len_u64), &mut std::io::sink())
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if skipped < len_u64 {
            return Err(McpServerError::Transport("stdio closed".to_string()));
        }
        return Ok(Inbound::TooLarge(len));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Inbound::Message(buf))
}

/// Writes one stdio message in the given framing.
fn write_message(writer: &mut impl Write, framing: Framing, payload: &[u8]) -> Result<(), McpServerError> {
    let write_failed = |_: std::io::Error| McpServerError::Transport("stdio write failed".to_string());
    match framing {
        Framing::ContentLength => {
            let header = format!("Content-Length: {}\r\n\r\n", payload.len());
            writer.write_all(header.as_bytes()).map_err(write_failed)?;
            writer.write_all(payload).map_err(write_failed)?;
        }
        Framing::Line => {
            writer.write_all(payload).map_err(write_failed)?;
            writer.write_all(b"\n").map_err(write_failed)?;
        }
    }
    writer.flush().map_err(write_failed)
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Serves JSON-RPC requests over HTTP.
async fn serve_http(addr: SocketAddr, state: Arc<ServerState>) -> Result<(), McpServerError> {
    let body_limit = state.max_body_bytes;
    let app = Router::new()
        .route("/rpc", post(handle_http))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    bytes: Bytes,
) -> Response {
    let context = RequestContext::http(peer);
    let outcome = tokio::task::spawn_blocking(move || state.handle_payload(&bytes, context)).await;
    match outcome {
        Ok(Some((status, body))) => (status, [(CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, "application/json")],
            br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32050,"message":"request task failed"}}"#
                .to_vec(),
        )
            .into_response(),
    }
}

/// Warns when HTTP is bound beyond loopback; the endpoint has no auth.
fn emit_bind_warning(server: &ServerConfig) {
    if server.transport != ServerTransport::Http {
        return;
    }
    if let Ok(addr) = server.bind_addr()
        && !addr.ip().is_loopback()
    {
        let _ = writeln!(
            std::io::stderr(),
            "gtm-mcp: WARNING: http transport bound to non-loopback address {addr} without \
             authentication"
        );
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
