// crates/gtm-mcp/src/tooling.rs
// ============================================================================
// Module: MCP Tool Contracts
// Description: Tool names, descriptions, and JSON input schemas.
// Purpose: Define the canonical MCP tool surface for GTM operations.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every tool exposed over MCP is listed in [`ToolName`] and described by a
//! [`ToolDefinition`] carrying a JSON Schema (draft 2020-12) for its
//! arguments. Schemas reject unknown properties so argument typos surface as
//! invalid-params errors instead of being silently ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Canonical MCP tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// List accessible GTM accounts.
    GtmListAccounts,
    /// List containers in an account.
    GtmListContainers,
    /// List tags in a workspace.
    GtmListTags,
    /// Fetch one tag.
    GtmGetTag,
    /// Create a tag.
    GtmCreateTag,
    /// Replace a tag.
    GtmUpdateTag,
    /// List triggers in a workspace.
    GtmListTriggers,
    /// Create a trigger.
    GtmCreateTrigger,
    /// List variables in a workspace.
    GtmListVariables,
    /// Fetch one variable.
    GtmGetVariable,
    /// Create a variable.
    GtmCreateVariable,
    /// Create and publish a container version.
    GtmPublishContainer,
    /// List container version headers.
    GtmListVersions,
    /// Fetch one container version.
    GtmGetVersion,
    /// Fetch the published container version.
    GtmGetLiveVersion,
    /// Fetch the latest container version header.
    GtmGetLatestVersion,
    /// Delete a container version.
    GtmDeleteVersion,
    /// Restore a deleted container version.
    GtmUndeleteVersion,
    /// Replace a container version.
    GtmUpdateVersion,
    /// Mark a container version as latest.
    GtmSetLatestVersion,
    /// Create a GA4 configuration tag.
    #[serde(rename = "gtm_create_ga4_config_tag")]
    GtmCreateGa4ConfigTag,
    /// Create a GA4 event tag.
    #[serde(rename = "gtm_create_ga4_event_tag")]
    GtmCreateGa4EventTag,
    /// Create a Scroll Depth trigger.
    GtmCreateScrollTrigger,
}

impl ToolName {
    /// Returns the canonical string name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GtmListAccounts => "gtm_list_accounts",
            Self::GtmListContainers => "gtm_list_containers",
            Self::GtmListTags => "gtm_list_tags",
            Self::GtmGetTag => "gtm_get_tag",
            Self::GtmCreateTag => "gtm_create_tag",
            Self::GtmUpdateTag => "gtm_update_tag",
            Self::GtmListTriggers => "gtm_list_triggers",
            Self::GtmCreateTrigger => "gtm_create_trigger",
            Self::GtmListVariables => "gtm_list_variables",
            Self::GtmGetVariable => "gtm_get_variable",
            Self::GtmCreateVariable => "gtm_create_variable",
            Self::GtmPublishContainer => "gtm_publish_container",
            Self::GtmListVersions => "gtm_list_versions",
            Self::GtmGetVersion => "gtm_get_version",
            Self::GtmGetLiveVersion => "gtm_get_live_version",
            Self::GtmGetLatestVersion => "gtm_get_latest_version",
            Self::GtmDeleteVersion => "gtm_delete_version",
            Self::GtmUndeleteVersion => "gtm_undelete_version",
            Self::GtmUpdateVersion => "gtm_update_version",
            Self::GtmSetLatestVersion => "gtm_set_latest_version",
            Self::GtmCreateGa4ConfigTag => "gtm_create_ga4_config_tag",
            Self::GtmCreateGa4EventTag => "gtm_create_ga4_event_tag",
            Self::GtmCreateScrollTrigger => "gtm_create_scroll_trigger",
        }
    }

    /// Returns every tool in listing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::GtmListAccounts,
            Self::GtmListContainers,
            Self::GtmListTags,
            Self::GtmGetTag,
            Self::GtmCreateTag,
            Self::GtmUpdateTag,
            Self::GtmListTriggers,
            Self::GtmCreateTrigger,
            Self::GtmListVariables,
            Self::GtmGetVariable,
            Self::GtmCreateVariable,
            Self::GtmPublishContainer,
            Self::GtmListVersions,
            Self::GtmGetVersion,
            Self::GtmGetLiveVersion,
            Self::GtmGetLatestVersion,
            Self::GtmDeleteVersion,
            Self::GtmUndeleteVersion,
            Self::GtmUpdateVersion,
            Self::GtmSetLatestVersion,
            Self::GtmCreateGa4ConfigTag,
            Self::GtmCreateGa4EventTag,
            Self::GtmCreateScrollTrigger,
        ]
    }

    /// Parses a tool name from its canonical string.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.as_str() == name)
    }
}

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// MCP tool definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: ToolName,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Returns the definitions of every tool, in listing order.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::all()
        .iter()
        .map(|name| ToolDefinition {
            name: *name,
            description: description(*name).to_string(),
            input_schema: input_schema(*name),
        })
        .collect()
}

/// Returns the description of a tool.
const fn description(name: ToolName) -> &'static str {
    match name {
        ToolName::GtmListAccounts => "List all accessible GTM accounts.",
        ToolName::GtmListContainers => "List all containers in a GTM account.",
        ToolName::GtmListTags => {
            "List all tags in a container workspace. Uses the first workspace when workspace_id \
             is omitted."
        }
        ToolName::GtmGetTag => "Get the detailed configuration of a specific tag.",
        ToolName::GtmCreateTag => "Create a new tag in a GTM container workspace.",
        ToolName::GtmUpdateTag => "Replace an existing tag with a complete tag object.",
        ToolName::GtmListTriggers => "List all triggers in a container workspace.",
        ToolName::GtmCreateTrigger => {
            "Create a new trigger. For Custom Event triggers, custom_event_name generates the \
             customEventFilter."
        }
        ToolName::GtmListVariables => "List all variables in a container workspace.",
        ToolName::GtmGetVariable => "Get the detailed configuration of a specific variable.",
        ToolName::GtmCreateVariable => "Create a new variable in a GTM container workspace.",
        ToolName::GtmPublishContainer => {
            "Create a version from a workspace and publish it as the live container version."
        }
        ToolName::GtmListVersions => "List container version headers.",
        ToolName::GtmGetVersion => "Get a specific container version.",
        ToolName::GtmGetLiveVersion => "Get the currently published container version.",
        ToolName::GtmGetLatestVersion => "Get the latest container version header.",
        ToolName::GtmDeleteVersion => "Delete a container version.",
        ToolName::GtmUndeleteVersion => "Restore a deleted container version.",
        ToolName::GtmUpdateVersion => "Replace a container version with a complete version object.",
        ToolName::GtmSetLatestVersion => "Mark a container version as the latest version.",
        ToolName::GtmCreateGa4ConfigTag => {
            "Create a GA4 configuration tag (gaawc) with measurement ID and page view settings."
        }
        ToolName::GtmCreateGa4EventTag => {
            "Create a GA4 event tag (gaawe) referencing a configuration tag."
        }
        ToolName::GtmCreateScrollTrigger => {
            "Create a Scroll Depth trigger firing at the given vertical percentages."
        }
    }
}

/// Returns the input schema of a tool.
fn input_schema(name: ToolName) -> Value {
    match name {
        ToolName::GtmListAccounts => tool_input_schema(&json!({}), &[]),
        ToolName::GtmListContainers => tool_input_schema(
            &json!({ "account_id": schema_string("GTM account ID.") }),
            &["account_id"],
        ),
        ToolName::GtmListTags => tool_input_schema(
            &json!({
                "container_path": schema_string(
                    "Container path (accounts/{accountId}/containers/{containerId})."
                ),
                "workspace_id": schema_string("Workspace ID; defaults to the first workspace."),
            }),
            &["container_path"],
        ),
        ToolName::GtmGetTag => tool_input_schema(
            &json!({ "tag_path": schema_string("Full tag path.") }),
            &["tag_path"],
        ),
        ToolName::GtmCreateTag => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "tag_name": schema_string("Name for the new tag."),
                "tag_type": schema_string("Tag type code (e.g. html, gaawe, gaawc)."),
                "tag_config": schema_object("Tag configuration converted to TEMPLATE parameters."),
                "firing_trigger_ids": trigger_ids_schema(),
            }),
            &["workspace_path", "tag_name", "tag_type"],
        ),
        ToolName::GtmUpdateTag => tool_input_schema(
            &json!({
                "tag_path": schema_string("Full tag path."),
                "tag_data": schema_object("Complete tag object."),
            }),
            &["tag_path", "tag_data"],
        ),
        ToolName::GtmListTriggers | ToolName::GtmListVariables => tool_input_schema(
            &json!({ "workspace_path": workspace_path_schema() }),
            &["workspace_path"],
        ),
        ToolName::GtmCreateTrigger => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "trigger_name": schema_string("Name for the new trigger."),
                "trigger_type": schema_string(
                    "Trigger type as a registry code (CUSTOM_EVENT) or API name (customEvent)."
                ),
                "custom_event_name": schema_string(
                    "Event name matched by a Custom Event trigger."
                ),
                "trigger_config": schema_object("Trigger fields copied to the request body."),
            }),
            &["workspace_path", "trigger_name", "trigger_type"],
        ),
        ToolName::GtmGetVariable => tool_input_schema(
            &json!({ "variable_path": schema_string("Full variable path.") }),
            &["variable_path"],
        ),
        ToolName::GtmCreateVariable => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "variable_name": schema_string("Name for the new variable."),
                "variable_type": schema_string(
                    "Variable type code: c (constant), v (data layer), jsm, u, k, awec, ..."
                ),
                "variable_config": schema_object("Type-specific variable configuration."),
            }),
            &["workspace_path", "variable_name", "variable_type"],
        ),
        ToolName::GtmPublishContainer => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "version_name": schema_string("Name for the new version."),
                "version_notes": schema_string("Notes describing the version."),
            }),
            &["workspace_path", "version_name"],
        ),
        ToolName::GtmListVersions => tool_input_schema(
            &json!({
                "container_path": schema_string("Full container path."),
                "include_deleted": {
                    "type": "boolean",
                    "description": "Include deleted versions."
                },
            }),
            &["container_path"],
        ),
        ToolName::GtmGetLiveVersion | ToolName::GtmGetLatestVersion => tool_input_schema(
            &json!({ "container_path": schema_string("Full container path.") }),
            &["container_path"],
        ),
        ToolName::GtmGetVersion
        | ToolName::GtmDeleteVersion
        | ToolName::GtmUndeleteVersion
        | ToolName::GtmSetLatestVersion => tool_input_schema(
            &json!({ "version_path": schema_string("Full container version path.") }),
            &["version_path"],
        ),
        ToolName::GtmUpdateVersion => tool_input_schema(
            &json!({
                "version_path": schema_string("Full container version path."),
                "version_data": schema_object("Complete container version object."),
            }),
            &["version_path", "version_data"],
        ),
        ToolName::GtmCreateGa4ConfigTag => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "tag_name": schema_string("Name for the new tag."),
                "measurement_id": schema_string("GA4 measurement ID (G-XXXXXXX)."),
                "send_page_view": {
                    "type": "boolean",
                    "description": "Send a page view on load (default true)."
                },
                "additional_config": schema_object(
                    "Extra settings merged over the base parameters."
                ),
                "firing_trigger_ids": trigger_ids_schema(),
            }),
            &["workspace_path", "tag_name", "measurement_id"],
        ),
        ToolName::GtmCreateGa4EventTag => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "tag_name": schema_string("Name for the new tag."),
                "config_tag_name": schema_string("Name of the GA4 configuration tag."),
                "event_name": schema_string("GA4 event name."),
                "event_parameters": {
                    "type": "array",
                    "description": "Event parameters as name/value records.",
                    "items": {
                        "type": "object",
                        "required": ["name", "value"],
                        "properties": {
                            "name": { "type": "string" },
                            "value": { "type": "string" }
                        }
                    }
                },
                "send_ecommerce": {
                    "type": "boolean",
                    "description": "Send ecommerce data with the event."
                },
                "firing_trigger_ids": trigger_ids_schema(),
            }),
            &["workspace_path", "tag_name", "config_tag_name", "event_name"],
        ),
        ToolName::GtmCreateScrollTrigger => tool_input_schema(
            &json!({
                "workspace_path": workspace_path_schema(),
                "trigger_name": schema_string("Name for the new trigger."),
                "percentages": {
                    "type": "array",
                    "description": "Vertical scroll thresholds between 0 and 100.",
                    "items": { "type": "integer", "minimum": 0, "maximum": 100 },
                    "minItems": 1
                },
            }),
            &["workspace_path", "trigger_name", "percentages"],
        ),
    }
}

// ============================================================================
// SECTION: Schema Helpers
// ============================================================================

/// Builds a closed object schema tagged with the JSON Schema dialect.
fn tool_input_schema(properties: &Value, required: &[&str]) -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": required,
        "properties": properties,
        "additionalProperties": false
    })
}

/// Builds a described string schema.
fn schema_string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

/// Builds a described open object schema.
fn schema_object(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

/// Schema for workspace path arguments.
fn workspace_path_schema() -> Value {
    schema_string("Workspace path (accounts/{accountId}/containers/{containerId}/workspaces/{workspaceId}).")
}

/// Schema for firing trigger id lists.
fn trigger_ids_schema() -> Value {
    json!({
        "type": "array",
        "description": "Trigger IDs that fire the tag.",
        "items": { "type": "string" }
    })
}
