// crates/gtm-mcp/src/server/tests.rs
// ============================================================================
// Module: MCP Server Tests
// Description: JSON-RPC dispatch, audit, and stdio framing tests.
// Purpose: Pin protocol behavior without sockets or network access.
// Dependencies: gtm-mcp, serde_json
// ============================================================================

//! ## Overview
//! Requests are fed to the shared handling state directly; stdio framing is
//! exercised over in-memory readers and writers.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufReader;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::Mutex;

use axum::http::StatusCode;
use gtm_config::GtmMcpConfig;
use serde_json::Value;
use serde_json::json;

use super::Framing;
use super::Inbound;
use super::McpServer;
use super::RequestContext;
use super::read_message;
use super::write_message;
use crate::audit::McpAuditEvent;
use crate::audit::McpAuditSink;
use crate::client::ApiError;
use crate::client::ApiRequest;
use crate::client::GtmApi;
use crate::client::GtmTransport;
use crate::telemetry::McpMethod;
use crate::telemetry::McpOutcome;
use crate::tooling::ToolName;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Transport answering every request with a fixed account listing.
struct AccountsTransport;

impl GtmTransport for AccountsTransport {
    fn execute(&self, _request: &ApiRequest) -> Result<Value, ApiError> {
        Ok(json!({"account": [{"accountId": "1234567890", "name": "Main", "path": "accounts/1234567890"}]}))
    }
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
struct RecordingSink {
    /// Recorded events.
    events: Mutex<Vec<McpAuditEvent>>,
}

impl McpAuditSink for RecordingSink {
    fn record(&self, event: &McpAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Builds a server with a recording sink.
fn server(restricted: Option<&str>, config: GtmMcpConfig) -> (McpServer, Arc<RecordingSink>) {
    let api = GtmApi::new(Arc::new(AccountsTransport), restricted.map(str::to_string));
    let sink = Arc::new(RecordingSink::default());
    let audit: Arc<dyn McpAuditSink> = sink.clone();
    (McpServer::new(config, ToolRouter::new(api), audit), sink)
}

/// Sends one request and decodes the response.
fn call(server: &McpServer, request: &Value) -> (StatusCode, Value) {
    let bytes = serde_json::to_vec(request).unwrap();
    let (status, body) = server.state.handle_payload(&bytes, RequestContext::stdio()).unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// SECTION: Dispatch Tests
// ============================================================================

/// Verifies initialize reports server info and echoes the protocol version.
#[test]
fn initialize_reports_server_info() {
    let (server, _) = server(None, GtmMcpConfig::default());
    let (status, response) = call(
        &server,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-03-26"}}),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(response["result"]["serverInfo"]["name"], "gtm-mcp");
    assert_eq!(response["result"]["capabilities"], json!({"tools": {}}));
}

/// Verifies notifications produce no response and no audit event.
#[test]
fn notifications_are_not_answered() {
    let (server, sink) = server(None, GtmMcpConfig::default());
    let bytes = br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
    assert!(server.state.handle_payload(bytes, RequestContext::stdio()).is_none());
    assert!(sink.events.lock().unwrap().is_empty());
}

/// Verifies an explicit null id is still answered.
#[test]
fn null_id_is_a_request() {
    let (server, _) = server(None, GtmMcpConfig::default());
    let (_, response) = call(&server, &json!({"jsonrpc": "2.0", "id": null, "method": "ping"}));
    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["result"], json!({}));
}

/// Verifies unknown methods and bad versions map to JSON-RPC codes.
#[test]
fn protocol_errors_use_jsonrpc_codes() {
    let (server, _) = server(None, GtmMcpConfig::default());
    let (status, response) = call(&server, &json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32601);

    let (status, response) = call(&server, &json!({"jsonrpc": "1.0", "id": 3, "method": "ping"}));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32600);

    let (status, body) = server.state.handle_payload(b"{not json", RequestContext::stdio()).unwrap();
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], Value::Null);
}

/// Verifies tools/list returns every registered tool.
#[test]
fn tools_list_returns_all_tools() {
    let (server, _) = server(None, GtmMcpConfig::default());
    let (_, response) = call(&server, &json!({"jsonrpc": "2.0", "id": 4, "method": "tools/list"}));
    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), ToolName::all().len());
    assert!(tools.iter().all(|tool| tool["inputSchema"].is_object()));
}

/// Verifies tool results are wrapped as pretty-printed text content.
#[test]
fn tool_results_are_text_content() {
    let (server, _) = server(None, GtmMcpConfig::default());
    let (status, response) = call(
        &server,
        &json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {"name": "gtm_list_accounts", "arguments": {}}}),
    );
    assert_eq!(status, StatusCode::OK);
    let content = &response["result"]["content"][0];
    assert_eq!(content["type"], "text");
    let parsed: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(parsed["accounts"][0]["accountId"], "1234567890");
}

/// Verifies tool failures map to their JSON-RPC codes.
#[test]
fn tool_errors_map_to_codes() {
    let (server, _) = server(Some("1111111111"), GtmMcpConfig::default());
    let (status, response) = call(
        &server,
        &json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call", "params": {
            "name": "gtm_get_tag",
            "arguments": {"tag_path": "accounts/2222222222/containers/1/workspaces/1/tags/3"}
        }}),
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(response["error"]["code"], -32003);

    let (status, response) = call(
        &server,
        &json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {
            "name": "gtm_get_tag",
            "arguments": {"tag_path": "containers/1"}
        }}),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["error"]["data"]["field"], "path");

    let (_, response) = call(
        &server,
        &json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {"name": "gtm_unknown"}}),
    );
    assert_eq!(response["error"]["code"], -32601);

    let (_, response) =
        call(&server, &json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call", "params": {"arguments": {}}}));
    assert_eq!(response["error"]["code"], -32602);
}

/// Verifies oversized payloads are rejected before parsing.
#[test]
fn oversized_payload_is_rejected() {
    let mut config = GtmMcpConfig::default();
    config.server.max_body_bytes = 16;
    let (server, sink) = server(None, config);
    let bytes = br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
    let (status, body) = server.state.handle_payload(bytes, RequestContext::stdio()).unwrap();
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response["error"]["code"], -32070);
    assert_eq!(sink.events.lock().unwrap()[0].method, McpMethod::Invalid);
}

// ============================================================================
// SECTION: Audit Tests
// ============================================================================

/// Verifies tool calls are audited with sizes and without arguments by default.
#[test]
fn tool_calls_are_audited() {
    let (server, sink) = server(None, GtmMcpConfig::default());
    call(
        &server,
        &json!({"jsonrpc": "2.0", "id": "a", "method": "tools/call", "params": {"name": "gtm_list_accounts", "arguments": {}}}),
    );
    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.method, McpMethod::ToolsCall);
    assert_eq!(event.tool.as_deref(), Some("gtm_list_accounts"));
    assert_eq!(event.request_id.as_deref(), Some("\"a\""));
    assert_eq!(event.outcome, McpOutcome::Ok);
    assert!(event.request_bytes > 0);
    assert!(event.response_bytes > 0);
    assert!(event.arguments.is_none());
}

/// Verifies arguments are audited when enabled and errors carry their code.
#[test]
fn audit_logs_arguments_when_enabled() {
    let mut config = GtmMcpConfig::default();
    config.audit.log_arguments = true;
    let (server, sink) = server(None, config);
    call(
        &server,
        &json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
            "name": "gtm_get_tag",
            "arguments": {"tag_path": "containers/1"}
        }}),
    );
    let events = sink.events.lock().unwrap();
    assert_eq!(events[0].arguments, Some(json!({"tag_path": "containers/1"})));
    assert_eq!(events[0].outcome, McpOutcome::Error);
    assert_eq!(events[0].error_code, Some(-32602));
}

// ============================================================================
// SECTION: Framing Tests
// ============================================================================

/// Verifies a framed payload at the limit is accepted.
#[test]
fn read_message_accepts_payload_at_limit() {
    let payload = br#"{"a":1}"#;
    let input = format!("Content-Length: {}\r\n\r\n{}", payload.len(), "{\"a\":1}");
    let mut reader = BufReader::new(Cursor::new(input.into_bytes()));
    let frame = read_message(&mut reader, payload.len()).unwrap().unwrap();
    assert_eq!(frame.framing, Framing::ContentLength);
    assert_eq!(frame.inbound, Inbound::Message(payload.to_vec()));
    assert!(read_message(&mut reader, payload.len()).unwrap().is_none());
}

/// Verifies an oversized framed payload is skipped and reading continues.
#[test]
fn read_message_skips_payload_over_limit() {
    let input = "Content-Length: 12\r\n\r\n{\"ab\":12345}content-length: 2\r\nContent-Type: x\r\n\r\n{}";
    let mut reader = BufReader::new(Cursor::new(input.as_bytes().to_vec()));
    let frame = read_message(&mut reader, 4).unwrap().unwrap();
    assert_eq!(frame.inbound, Inbound::TooLarge(12));
    let frame = read_message(&mut reader, 4).unwrap().unwrap();
    assert_eq!(frame.inbound, Inbound::Message(b"{}".to_vec()));
}

/// Verifies newline-delimited messages are detected and blank lines skipped.
#[test]
fn read_message_accepts_line_delimited_json() {
    let input = "\n{\"jsonrpc\":\"2.0\"}\r\n{\"id\":1}\n";
    let mut reader = BufReader::new(Cursor::new(input.as_bytes().to_vec()));
    let first = read_message(&mut reader, 1024).unwrap().unwrap();
    assert_eq!(first.framing, Framing::Line);
    assert_eq!(first.inbound, Inbound::Message(br#"{"jsonrpc":"2.0"}"#.to_vec()));
    let second = read_message(&mut reader, 1024).unwrap().unwrap();
    assert_eq!(second.inbound, Inbound::Message(br#"{"id":1}"#.to_vec()));
    assert!(read_message(&mut reader, 1024).unwrap().is_none());
}

/// Verifies an oversized line is discarded through its newline.
#[test]
fn read_message_skips_long_line() {
    let input = "{\"padding\":\"xxxxxxxxxxxxxxxxxxxx\"}\n{}\n";
    let mut reader = BufReader::new(Cursor::new(input.as_bytes().to_vec()));
    let frame = read_message(&mut reader, 8).unwrap().unwrap();
    assert!(matches!(frame.inbound, Inbound::TooLarge(_)));
    let frame = read_message(&mut reader, 8).unwrap().unwrap();
    assert_eq!(frame.inbound, Inbound::Message(b"{}".to_vec()));
}

/// Verifies header blocks without a content length are rejected.
#[test]
fn read_message_requires_content_length() {
    let mut reader = BufReader::new(Cursor::new(b"Content-Type: x\r\n\r\n{}".to_vec()));
    assert!(read_message(&mut reader, 1024).is_err());
}

/// Verifies responses are written in the request's framing.
#[test]
fn write_message_matches_framing() {
    let mut framed = Vec::new();
    write_message(&mut framed, Framing::ContentLength, b"{}").unwrap();
    assert_eq!(framed, b"Content-Length: 2\r\n\r\n{}".to_vec());

    let mut lined = Vec::new();
    write_message(&mut lined, Framing::Line, b"{}").unwrap();
    assert_eq!(lined, b"{}\n".to_vec());
}
