// crates/gtm-config/src/lib.rs
// ============================================================================
// Module: GTM Config Library
// Description: Canonical config model and validation for the GTM MCP server.
// Purpose: Single source of truth for gtm-mcp.toml semantics.
// Dependencies: gtm-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `gtm-config` defines the configuration model for the GTM MCP server. It
//! loads TOML with strict size and path limits, applies environment
//! overrides, and validates fail-closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
