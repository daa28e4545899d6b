// crates/gtm-mcp/src/audit.rs
// ============================================================================
// Module: MCP Audit Logging
// Description: Structured audit events for MCP request handling.
// Purpose: Emit JSON-line audit records through pluggable sinks.
// Dependencies: gtm-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Every JSON-RPC request produces one `mcp_request` event. Events are written
//! as single JSON lines so they can be shipped by any log collector. Tool
//! arguments are omitted unless `[audit].log_arguments` is set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use gtm_config::AuditConfig;
use gtm_config::ServerTransport;
use serde::Serialize;
use serde_json::Value;

use crate::telemetry::McpMethod;
use crate::telemetry::McpOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// MCP audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct McpAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// JSON-RPC request id rendered as text, when present.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// JSON-RPC method classification.
    pub method: McpMethod,
    /// Tool name as requested (tools/call only).
    pub tool: Option<String>,
    /// Request outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Tool arguments, only when argument logging is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    /// Redaction classification for payload logging.
    pub redaction: &'static str,
}

/// Inputs for building an [`McpAuditEvent`].
#[derive(Debug, Clone)]
pub struct McpAuditEventParams {
    /// JSON-RPC request id rendered as text.
    pub request_id: Option<String>,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Peer IP address when available.
    pub peer_ip: Option<String>,
    /// JSON-RPC method classification.
    pub method: McpMethod,
    /// Tool name as requested.
    pub tool: Option<String>,
    /// Request outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Tool arguments when argument logging is enabled.
    pub arguments: Option<Value>,
}

impl McpAuditEvent {
    /// Builds a request audit event stamped with the current time.
    #[must_use]
    pub fn new(params: McpAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        let redaction = if params.arguments.is_some() { "none" } else { "arguments_omitted" };
        Self {
            event: "mcp_request",
            timestamp_ms,
            request_id: params.request_id,
            transport: params.transport,
            peer_ip: params.peer_ip,
            method: params.method,
            tool: params.tool,
            outcome: params.outcome,
            error_code: params.error_code,
            request_bytes: params.request_bytes,
            response_bytes: params.response_bytes,
            arguments: params.arguments,
            redaction,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for MCP request events.
pub trait McpAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &McpAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct McpStderrAuditSink;

impl McpAuditSink for McpStderrAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct McpFileAuditSink {
    /// Append-only audit log handle.
    file: Mutex<std::fs::File>,
}

impl McpFileAuditSink {
    /// Opens a file-backed audit sink at the provided path.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened for append.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl McpAuditSink for McpFileAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct McpNoopAuditSink;

impl McpAuditSink for McpNoopAuditSink {
    fn record(&self, _event: &McpAuditEvent) {}
}

/// Selects the audit sink described by `[audit]`.
///
/// # Errors
///
/// Returns an error when the configured audit file cannot be opened.
pub fn sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn McpAuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(McpNoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(McpFileAuditSink::new(Path::new(path))?)),
        None => Ok(Arc::new(McpStderrAuditSink)),
    }
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
        reason = "Test-only audit assertions."
    )]

    use gtm_config::AuditConfig;
    use gtm_config::ServerTransport;
    use serde_json::Value;
    use serde_json::json;

    use super::McpAuditEvent;
    use super::McpAuditEventParams;
    use super::sink_from_config;
    use crate::telemetry::McpMethod;
    use crate::telemetry::McpOutcome;

    fn params(arguments: Option<Value>) -> McpAuditEventParams {
        McpAuditEventParams {
            request_id: Some("7".to_string()),
            transport: ServerTransport::Stdio,
            peer_ip: None,
            method: McpMethod::ToolsCall,
            tool: Some("gtm_get_tag".to_string()),
            outcome: McpOutcome::Error,
            error_code: Some(-32020),
            request_bytes: 64,
            response_bytes: 128,
            arguments,
        }
    }

    #[test]
    fn event_omits_arguments_unless_logged() {
        let event = serde_json::to_value(McpAuditEvent::new(params(None))).unwrap();
        assert_eq!(event["event"], "mcp_request");
        assert_eq!(event["method"], "tools_call");
        assert_eq!(event["transport"], "stdio");
        assert_eq!(event["redaction"], "arguments_omitted");
        assert!(event.get("arguments").is_none());

        let logged =
            serde_json::to_value(McpAuditEvent::new(params(Some(json!({"tag_path": "x"}))))).unwrap();
        assert_eq!(logged["redaction"], "none");
        assert_eq!(logged["arguments"]["tag_path"], "x");
    }

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let config = AuditConfig {
            enabled: true,
            path: Some(path.to_string_lossy().into_owned()),
            log_arguments: false,
        };
        let sink = sink_from_config(&config).unwrap();
        sink.record(&McpAuditEvent::new(params(None)));
        sink.record(&McpAuditEvent::new(params(None)));
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["error_code"], -32020);
    }

    #[test]
    fn disabled_audit_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let config = AuditConfig {
            enabled: false,
            path: Some(path.to_string_lossy().into_owned()),
            log_arguments: true,
        };
        let sink = sink_from_config(&config).unwrap();
        sink.record(&McpAuditEvent::new(params(None)));
        assert!(!path.exists());
    }
}
