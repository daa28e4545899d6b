// crates/gtm-mcp/tests/tool_schemas.rs
// ============================================================================
// Module: Tool Schema Tests
// Description: Compiles every tool input schema and checks sample payloads.
// Purpose: Keep advertised schemas valid and aligned with argument decoding.
// Dependencies: gtm-mcp, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Every advertised input schema must compile under Draft 2020-12, reject
//! unknown arguments, and accept the payloads the router accepts.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use gtm_mcp::ToolDefinition;
use gtm_mcp::ToolName;
use gtm_mcp::tool_definitions;
use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use serde_json::json;

/// Result type for assertion helpers.
type TestResult = Result<(), String>;

/// Compiles a schema under Draft 2020-12.
fn compile_schema(schema: &Value) -> Result<Validator, String> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| format!("failed to compile schema: {err}"))
}

/// Looks up a tool definition by name.
fn definition(name: ToolName) -> Result<ToolDefinition, String> {
    tool_definitions()
        .into_iter()
        .find(|definition| definition.name == name)
        .ok_or_else(|| format!("missing definition for {}", name.as_str()))
}

// ============================================================================
// SECTION: Registry
// ============================================================================

#[test]
fn tool_names_are_unique_and_parse_back() -> TestResult {
    let definitions = tool_definitions();
    let mut seen = BTreeSet::new();
    for definition in &definitions {
        let name = definition.name.as_str();
        if !seen.insert(name) {
            return Err(format!("duplicate tool name: {name}"));
        }
        if ToolName::parse(name) != Some(definition.name) {
            return Err(format!("tool name does not parse back: {name}"));
        }
        if definition.description.is_empty() {
            return Err(format!("tool has no description: {name}"));
        }
    }
    if definitions.len() != ToolName::all().len() {
        return Err("definition count differs from tool registry".to_string());
    }
    Ok(())
}

#[test]
fn tool_names_serialize_as_wire_names() -> TestResult {
    for name in ToolName::all() {
        let value = serde_json::to_value(name).map_err(|err| err.to_string())?;
        if value != Value::String(name.as_str().to_string()) {
            return Err(format!("serialized name mismatch for {}", name.as_str()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

#[test]
fn every_input_schema_compiles_and_is_closed() -> TestResult {
    for definition in tool_definitions() {
        let validator = compile_schema(&definition.input_schema)?;
        if definition.input_schema["additionalProperties"] != json!(false) {
            return Err(format!("schema is open: {}", definition.name.as_str()));
        }
        if validator.is_valid(&json!({"unexpected_argument": true})) {
            return Err(format!("schema accepts unknown argument: {}", definition.name.as_str()));
        }
    }
    Ok(())
}

#[test]
fn scroll_trigger_schema_bounds_percentages() -> TestResult {
    let validator = compile_schema(&definition(ToolName::GtmCreateScrollTrigger)?.input_schema)?;
    let base = json!({
        "workspace_path": "accounts/1/containers/2/workspaces/3",
        "trigger_name": "Scroll",
    });
    let with = |percentages: Value| {
        let mut payload = base.clone();
        payload["percentages"] = percentages;
        payload
    };
    if !validator.is_valid(&with(json!([25, 50, 100]))) {
        return Err("valid thresholds rejected".to_string());
    }
    if validator.is_valid(&with(json!([101]))) {
        return Err("threshold above 100 accepted".to_string());
    }
    if validator.is_valid(&with(json!([]))) {
        return Err("empty threshold list accepted".to_string());
    }
    Ok(())
}

#[test]
fn ga4_event_schema_requires_config_tag() -> TestResult {
    let validator = compile_schema(&definition(ToolName::GtmCreateGa4EventTag)?.input_schema)?;
    let payload = json!({
        "workspace_path": "accounts/1/containers/2/workspaces/3",
        "tag_name": "GA4 - purchase",
        "config_tag_name": "GA4 Config",
        "event_name": "purchase",
        "event_parameters": [{"name": "currency", "value": "USD"}],
    });
    if !validator.is_valid(&payload) {
        return Err("complete payload rejected".to_string());
    }
    let mut missing = payload;
    if let Some(object) = missing.as_object_mut() {
        object.remove("config_tag_name");
    }
    if validator.is_valid(&missing) {
        return Err("payload without config_tag_name accepted".to_string());
    }
    Ok(())
}

#[test]
fn list_accounts_schema_accepts_empty_arguments() -> TestResult {
    let validator = compile_schema(&definition(ToolName::GtmListAccounts)?.input_schema)?;
    if !validator.is_valid(&json!({})) {
        return Err("empty arguments rejected".to_string());
    }
    Ok(())
}
