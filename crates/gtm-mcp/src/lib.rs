// crates/gtm-mcp/src/lib.rs
// ============================================================================
// Module: GTM MCP Library
// Description: MCP server exposing Google Tag Manager tools.
// Purpose: Wire the GTM REST client, tool router, and JSON-RPC transports.
// Dependencies: gtm-core, gtm-config, axum, reqwest, tokio
// ============================================================================

//! ## Overview
//! `gtm-mcp` serves the GTM tool surface over MCP. Tool arguments are
//! validated and assembled by `gtm-core`, sent through a [`GtmTransport`],
//! and summarized back to the client. An optional account restriction is
//! enforced before any request leaves the process.
//!
//! Security posture: tool arguments and API responses are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod auth;
pub mod client;
pub mod server;
pub mod telemetry;
pub mod tooling;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpFileAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpStderrAuditSink;
pub use auth::AuthError;
pub use client::ApiError;
pub use client::ApiRequest;
pub use client::ClientError;
pub use client::GtmApi;
pub use client::GtmTransport;
pub use client::HttpGtmTransport;
pub use client::HttpMethod;
pub use server::McpServer;
pub use server::McpServerError;
pub use tooling::ToolDefinition;
pub use tooling::ToolName;
pub use tooling::tool_definitions;
pub use tools::ToolError;
pub use tools::ToolRouter;
