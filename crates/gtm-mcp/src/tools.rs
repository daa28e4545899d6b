// crates/gtm-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Decoding, validation, assembly, and dispatch of GTM tools.
// Purpose: Turn MCP tool calls into validated GTM API requests.
// Dependencies: gtm-core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ToolRouter`] is the dispatch layer between JSON-RPC and the GTM API.
//! Each handler decodes its arguments into a closed struct, validates paths
//! and fields with the core validators, assembles request bodies with the
//! core builders, and calls [`GtmApi`]. Results are summarized into compact
//! JSON objects rather than echoing full API responses, except for the `get`
//! tools which return the entity as-is.
//!
//! Security posture: arguments are untrusted. Account restriction is
//! enforced inside [`GtmApi`] for every path-addressed call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use gtm_core::GtmError;
use gtm_core::ParameterFormatError;
use gtm_core::TagDraft;
use gtm_core::TagRequest;
use gtm_core::TriggerRequest;
use gtm_core::ValidationError;
use gtm_core::VariableRequest;
use gtm_core::WorkspacePath;
use gtm_core::build_ga4_config_tag;
use gtm_core::build_ga4_event_tag;
use gtm_core::build_parameters_from_config;
use gtm_core::build_scroll_depth_trigger;
use gtm_core::build_tag;
use gtm_core::build_trigger;
use gtm_core::build_variable;
use gtm_core::build_version;
use gtm_core::constants::GTM_NAME_MAX_LENGTH;
use gtm_core::validation::validate_account_id;
use gtm_core::validation::validate_event_parameters;
use gtm_core::validation::validate_ga4_event_name;
use gtm_core::validation::validate_gtm_path;
use gtm_core::validation::validate_name;
use gtm_core::validation::validate_trigger_ids;
use gtm_core::validation::validate_workspace_id;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::client::ClientError;
use crate::client::GtmApi;
use crate::tooling::ToolDefinition;
use crate::tooling::ToolName;
use crate::tooling::tool_definitions;

// ============================================================================
// SECTION: Router
// ============================================================================

/// Routes MCP tool calls to GTM operations.
#[derive(Clone)]
pub struct ToolRouter {
    /// GTM API facade with the account restriction applied.
    api: GtmApi,
}

impl ToolRouter {
    /// Creates a router over a GTM API facade.
    #[must_use]
    pub const fn new(api: GtmApi) -> Self {
        Self {
            api,
        }
    }

    /// Lists the MCP tools supported by this router.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Handles a tool call by name with JSON arguments.
    ///
    /// Missing (`null`) arguments are treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when routing, validation, or the API call fails.
    pub fn handle_tool_call(&self, name: &str, payload: Value) -> Result<Value, ToolError> {
        let tool = ToolName::parse(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let payload = if payload.is_null() { Value::Object(Map::new()) } else { payload };
        match tool {
            ToolName::GtmListAccounts => {
                decode::<NoArgs>(payload)?;
                self.list_accounts()
            }
            ToolName::GtmListContainers => self.list_containers(&decode(payload)?),
            ToolName::GtmListTags => self.list_tags(&decode(payload)?),
            ToolName::GtmGetTag => {
                let args: TagPathArgs = decode(payload)?;
                let path = validate_gtm_path(&args.tag_path, Some("tag"))?;
                Ok(json!({ "tag": self.api.get_tag(&path)? }))
            }
            ToolName::GtmCreateTag => self.create_tag(decode(payload)?),
            ToolName::GtmUpdateTag => self.update_tag(&decode(payload)?),
            ToolName::GtmListTriggers => self.list_triggers(&decode(payload)?),
            ToolName::GtmCreateTrigger => self.create_trigger(decode(payload)?),
            ToolName::GtmListVariables => self.list_variables(&decode(payload)?),
            ToolName::GtmGetVariable => {
                let args: VariablePathArgs = decode(payload)?;
                let path = validate_gtm_path(&args.variable_path, Some("variable"))?;
                Ok(json!({ "variable": self.api.get_variable(&path)? }))
            }
            ToolName::GtmCreateVariable => self.create_variable(decode(payload)?),
            ToolName::GtmPublishContainer => self.publish_container(&decode(payload)?),
            ToolName::GtmListVersions => self.list_versions(&decode(payload)?),
            ToolName::GtmGetVersion => {
                let path = version_path(decode(payload)?)?;
                Ok(json!({ "version": self.api.get_version(&path)? }))
            }
            ToolName::GtmGetLiveVersion => {
                let path = container_path(decode(payload)?)?;
                Ok(json!({ "version": self.api.get_live_version(&path)? }))
            }
            ToolName::GtmGetLatestVersion => {
                let path = container_path(decode(payload)?)?;
                Ok(json!({ "version": self.api.get_latest_version(&path)? }))
            }
            ToolName::GtmDeleteVersion => {
                let path = version_path(decode(payload)?)?;
                self.api.delete_version(&path)?;
                Ok(json!({
                    "success": true,
                    "message": format!("Version deleted successfully: {path}"),
                }))
            }
            ToolName::GtmUndeleteVersion => {
                let path = version_path(decode(payload)?)?;
                let result = self.api.undelete_version(&path)?;
                Ok(version_summary(container_version(&result)))
            }
            ToolName::GtmUpdateVersion => self.update_version(&decode(payload)?),
            ToolName::GtmSetLatestVersion => {
                let path = version_path(decode(payload)?)?;
                let result = self.api.set_latest_version(&path)?;
                Ok(version_summary(container_version(&result)))
            }
            ToolName::GtmCreateGa4ConfigTag => self.create_ga4_config_tag(decode(payload)?),
            ToolName::GtmCreateGa4EventTag => self.create_ga4_event_tag(decode(payload)?),
            ToolName::GtmCreateScrollTrigger => self.create_scroll_trigger(&decode(payload)?),
        }
    }

    /// Lists accounts.
    fn list_accounts(&self) -> Result<Value, ToolError> {
        let accounts = self.api.list_accounts()?;
        Ok(json!({ "accounts": summarize(&accounts, &["accountId", "name", "path"]) }))
    }

    /// Lists containers in an account.
    fn list_containers(&self, args: &AccountArgs) -> Result<Value, ToolError> {
        let account_id = validate_account_id(&args.account_id)?;
        let containers = self.api.list_containers(&account_id)?;
        Ok(json!({
            "containers": summarize(&containers, &["containerId", "name", "path", "publicId"]),
        }))
    }

    /// Lists tags in the named or first workspace of a container.
    fn list_tags(&self, args: &ListTagsArgs) -> Result<Value, ToolError> {
        let container = validate_gtm_path(&args.container_path, Some("container"))?;
        let workspace = match &args.workspace_id {
            Some(workspace_id) => {
                format!("{container}/workspaces/{}", validate_workspace_id(workspace_id)?)
            }
            None => self.first_workspace(&container)?,
        };
        let tags = self.api.list_tags(&workspace)?;
        Ok(json!({ "tags": summarize(&tags, &["tagId", "name", "type", "path"]) }))
    }

    /// Returns the path of the first workspace in a container.
    fn first_workspace(&self, container: &str) -> Result<String, ToolError> {
        let workspaces = self.api.list_workspaces(container)?;
        workspaces
            .first()
            .and_then(|workspace| workspace.get("path"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ToolError::Api("No workspaces found in container".to_string()))
    }

    /// Creates a generic tag.
    fn create_tag(&self, args: CreateTagArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let draft = build_tag(&TagRequest {
            tag_name: args.tag_name,
            tag_type: args.tag_type,
            tag_config: args.tag_config,
            firing_trigger_ids: args.firing_trigger_ids,
        })?;
        let created = self.api.create_tag(&workspace, &draft)?;
        Ok(tag_summary(&created))
    }

    /// Replaces a tag.
    fn update_tag(&self, args: &UpdateTagArgs) -> Result<Value, ToolError> {
        let path = validate_gtm_path(&args.tag_path, Some("tag"))?;
        let updated = self.api.update_tag(&path, &Value::Object(args.tag_data.clone()))?;
        Ok(tag_summary(&updated))
    }

    /// Lists triggers in a workspace.
    fn list_triggers(&self, args: &WorkspaceArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let triggers = self.api.list_triggers(&workspace)?;
        Ok(json!({ "triggers": summarize(&triggers, &["triggerId", "name", "type", "path"]) }))
    }

    /// Creates a trigger.
    fn create_trigger(&self, args: CreateTriggerArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let draft = build_trigger(&TriggerRequest {
            trigger_name: args.trigger_name,
            trigger_type: args.trigger_type,
            custom_event_name: args.custom_event_name,
            trigger_config: args.trigger_config,
        })?;
        let created = self.api.create_trigger(&workspace, &draft)?;
        Ok(trigger_summary(&created))
    }

    /// Lists variables in a workspace.
    fn list_variables(&self, args: &WorkspaceArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let variables = self.api.list_variables(&workspace)?;
        Ok(json!({
            "variables": summarize(&variables, &["variableId", "name", "type", "path"]),
        }))
    }

    /// Creates a variable.
    fn create_variable(&self, args: CreateVariableArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let draft = build_variable(&VariableRequest {
            variable_name: args.variable_name,
            variable_type: args.variable_type,
            variable_config: args.variable_config,
        })?;
        let created = self.api.create_variable(&workspace, &draft)?;
        Ok(json!({
            "success": true,
            "variable": pick(&created, &["variableId", "name", "type", "path"]),
        }))
    }

    /// Creates a version from a workspace and publishes it.
    fn publish_container(&self, args: &PublishArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let draft = build_version(&args.version_name, args.version_notes.as_deref())?;
        let created = self.api.create_version(&workspace, &draft)?;
        let version_path = container_version(&created)
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::Api("Failed to create version".to_string()))?;
        let published = self.api.publish_version(version_path)?;
        let version = container_version(&published);
        Ok(json!({
            "success": true,
            "version": {
                "versionId": field(version, "containerVersionId"),
                "name": field(version, "name"),
                "published": true,
            },
        }))
    }

    /// Lists version headers of a container.
    fn list_versions(&self, args: &ListVersionsArgs) -> Result<Value, ToolError> {
        let container = validate_gtm_path(&args.container_path, Some("container"))?;
        let headers = self.api.list_versions(&container, args.include_deleted)?;
        Ok(json!({
            "versions": summarize(&headers, &["containerVersionId", "name", "path", "deleted"]),
        }))
    }

    /// Replaces a container version.
    fn update_version(&self, args: &UpdateVersionArgs) -> Result<Value, ToolError> {
        let path = validate_gtm_path(&args.version_path, Some("version"))?;
        let updated = self.api.update_version(&path, &Value::Object(args.version_data.clone()))?;
        Ok(version_summary(&updated))
    }

    /// Creates a GA4 configuration tag.
    fn create_ga4_config_tag(&self, args: Ga4ConfigTagArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let name = validate_name(&args.tag_name, "tag_name", GTM_NAME_MAX_LENGTH)?;
        let measurement_id = validate_name(&args.measurement_id, "measurement_id", GTM_NAME_MAX_LENGTH)?;
        let additional = args
            .additional_config
            .as_ref()
            .map(build_parameters_from_config)
            .transpose()?
            .unwrap_or_default();
        let draft = build_ga4_config_tag(&name, &measurement_id, args.send_page_view, &additional);
        let draft = with_firing_triggers(draft, args.firing_trigger_ids.as_ref())?;
        let created = self.api.create_tag(&workspace, &draft)?;
        Ok(tag_summary(&created))
    }

    /// Creates a GA4 event tag.
    fn create_ga4_event_tag(&self, args: Ga4EventTagArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let name = validate_name(&args.tag_name, "tag_name", GTM_NAME_MAX_LENGTH)?;
        let config_tag = validate_name(&args.config_tag_name, "config_tag_name", GTM_NAME_MAX_LENGTH)?;
        let event_name = validate_ga4_event_name(&args.event_name)?;
        let parameters = args
            .event_parameters
            .as_ref()
            .map(validate_event_parameters)
            .transpose()?
            .unwrap_or_default();
        let draft =
            build_ga4_event_tag(&name, &config_tag, &event_name, &parameters, args.send_ecommerce);
        let draft = with_firing_triggers(draft, args.firing_trigger_ids.as_ref())?;
        let created = self.api.create_tag(&workspace, &draft)?;
        Ok(tag_summary(&created))
    }

    /// Creates a Scroll Depth trigger.
    fn create_scroll_trigger(&self, args: &ScrollTriggerArgs) -> Result<Value, ToolError> {
        let workspace = workspace_path(&args.workspace_path)?;
        let draft = build_scroll_depth_trigger(&args.trigger_name, &args.percentages)?;
        let created = self.api.create_trigger(&workspace, &draft)?;
        Ok(trigger_summary(&created))
    }
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Arguments for tools that take none.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

/// Arguments naming an account.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AccountArgs {
    /// Account id.
    account_id: String,
}

/// Arguments for `gtm_list_tags`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListTagsArgs {
    /// Container path.
    container_path: String,
    /// Optional workspace id.
    #[serde(default)]
    workspace_id: Option<String>,
}

/// Arguments naming a tag.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TagPathArgs {
    /// Tag path.
    tag_path: String,
}

/// Arguments for `gtm_create_tag`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateTagArgs {
    /// Workspace path.
    workspace_path: String,
    /// Tag name.
    tag_name: String,
    /// Tag type code.
    tag_type: String,
    /// Generic tag configuration.
    #[serde(default)]
    tag_config: Option<Map<String, Value>>,
    /// Firing trigger ids.
    #[serde(default)]
    firing_trigger_ids: Option<Value>,
}

/// Arguments for `gtm_update_tag`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateTagArgs {
    /// Tag path.
    tag_path: String,
    /// Complete tag body.
    tag_data: Map<String, Value>,
}

/// Arguments naming a workspace.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkspaceArgs {
    /// Workspace path.
    workspace_path: String,
}

/// Arguments for `gtm_create_trigger`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateTriggerArgs {
    /// Workspace path.
    workspace_path: String,
    /// Trigger name.
    trigger_name: String,
    /// Trigger type.
    trigger_type: String,
    /// Convenience Custom Event name.
    #[serde(default)]
    custom_event_name: Option<String>,
    /// Trigger configuration.
    #[serde(default)]
    trigger_config: Option<Map<String, Value>>,
}

/// Arguments naming a variable.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VariablePathArgs {
    /// Variable path.
    variable_path: String,
}

/// Arguments for `gtm_create_variable`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateVariableArgs {
    /// Workspace path.
    workspace_path: String,
    /// Variable name.
    variable_name: String,
    /// Variable type code.
    variable_type: String,
    /// Type-specific configuration.
    #[serde(default)]
    variable_config: Option<Map<String, Value>>,
}

/// Arguments for `gtm_publish_container`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PublishArgs {
    /// Workspace path.
    workspace_path: String,
    /// Version name.
    version_name: String,
    /// Version notes.
    #[serde(default)]
    version_notes: Option<String>,
}

/// Arguments for `gtm_list_versions`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListVersionsArgs {
    /// Container path.
    container_path: String,
    /// Include deleted versions.
    #[serde(default)]
    include_deleted: bool,
}

/// Arguments naming a container.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ContainerPathArgs {
    /// Container path.
    container_path: String,
}

/// Arguments naming a container version.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VersionPathArgs {
    /// Version path.
    version_path: String,
}

/// Arguments for `gtm_update_version`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateVersionArgs {
    /// Version path.
    version_path: String,
    /// Complete version body.
    version_data: Map<String, Value>,
}

/// Arguments for `gtm_create_ga4_config_tag`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Ga4ConfigTagArgs {
    /// Workspace path.
    workspace_path: String,
    /// Tag name.
    tag_name: String,
    /// GA4 measurement id.
    measurement_id: String,
    /// Send a page view on load.
    #[serde(default = "default_send_page_view")]
    send_page_view: bool,
    /// Extra settings merged over the base parameters.
    #[serde(default)]
    additional_config: Option<Map<String, Value>>,
    /// Firing trigger ids.
    #[serde(default)]
    firing_trigger_ids: Option<Value>,
}

/// Arguments for `gtm_create_ga4_event_tag`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Ga4EventTagArgs {
    /// Workspace path.
    workspace_path: String,
    /// Tag name.
    tag_name: String,
    /// Name of the GA4 configuration tag.
    config_tag_name: String,
    /// GA4 event name.
    event_name: String,
    /// Event parameter records.
    #[serde(default)]
    event_parameters: Option<Value>,
    /// Send ecommerce data.
    #[serde(default)]
    send_ecommerce: bool,
    /// Firing trigger ids.
    #[serde(default)]
    firing_trigger_ids: Option<Value>,
}

/// Arguments for `gtm_create_scroll_trigger`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ScrollTriggerArgs {
    /// Workspace path.
    workspace_path: String,
    /// Trigger name.
    trigger_name: String,
    /// Vertical scroll thresholds.
    percentages: Value,
}

/// Default for `send_page_view`.
const fn default_send_page_view() -> bool {
    true
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes tool arguments into a closed argument struct.
fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Validates and canonicalizes a workspace path.
fn workspace_path(path: &str) -> Result<String, ToolError> {
    let path = validate_gtm_path(path, Some("workspace"))?;
    Ok(WorkspacePath::parse(&path)?.as_path())
}

/// Validates a container path argument.
fn container_path(args: ContainerPathArgs) -> Result<String, ToolError> {
    Ok(validate_gtm_path(&args.container_path, Some("container"))?)
}

/// Validates a version path argument.
fn version_path(args: VersionPathArgs) -> Result<String, ToolError> {
    Ok(validate_gtm_path(&args.version_path, Some("version"))?)
}

/// Attaches validated firing trigger ids to a GA4 tag draft.
fn with_firing_triggers(mut draft: TagDraft, ids: Option<&Value>) -> Result<TagDraft, ToolError> {
    draft.firing_trigger_id = ids.map(validate_trigger_ids).transpose()?;
    Ok(draft)
}

/// Returns `entity[key]`, or null when absent.
fn field(entity: &Value, key: &str) -> Value {
    entity.get(key).cloned().unwrap_or(Value::Null)
}

/// Projects an entity onto the listed keys.
fn pick(entity: &Value, keys: &[&str]) -> Value {
    let summary: Map<String, Value> =
        keys.iter().map(|key| ((*key).to_string(), field(entity, key))).collect();
    Value::Object(summary)
}

/// Projects every entity onto the listed keys.
fn summarize(entities: &[Value], keys: &[&str]) -> Vec<Value> {
    entities.iter().map(|entity| pick(entity, keys)).collect()
}

/// Returns the nested `containerVersion` object, or null.
fn container_version(response: &Value) -> &Value {
    response.get("containerVersion").unwrap_or(&Value::Null)
}

/// Summarizes a created or updated tag.
fn tag_summary(tag: &Value) -> Value {
    json!({ "success": true, "tag": pick(tag, &["tagId", "name", "path"]) })
}

/// Summarizes a created trigger.
fn trigger_summary(trigger: &Value) -> Value {
    json!({ "success": true, "trigger": pick(trigger, &["triggerId", "name", "type", "path"]) })
}

/// Summarizes a container version.
fn version_summary(version: &Value) -> Value {
    json!({ "success": true, "version": pick(version, &["containerVersionId", "name", "path"]) })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    /// Arguments could not be decoded.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// An argument failed a validation rule.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Parameter assembly found a structural defect.
    #[error("invalid structure: {0}")]
    Structure(#[from] ParameterFormatError),
    /// The account restriction rejected the call.
    #[error("{0}")]
    Permission(String),
    /// The GTM API call failed.
    #[error("{0}")]
    Api(String),
    /// Internal failure.
    #[error("internal error: {0}")]
    Internal(String),
    /// Serialization failure.
    #[error("serialization failure")]
    Serialization,
}

impl ToolError {
    /// Returns structured error detail for validation and structure errors.
    #[must_use]
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::Validation(err) => serde_json::to_value(err).ok(),
            Self::Structure(err) => serde_json::to_value(err).ok(),
            _ => None,
        }
    }
}

impl From<GtmError> for ToolError {
    fn from(error: GtmError) -> Self {
        match error {
            GtmError::Validation(err) => Self::Validation(err),
            GtmError::ParameterFormat(err) => Self::Structure(err),
        }
    }
}

impl From<ClientError> for ToolError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Permission(message) => Self::Permission(message),
            ClientError::InvalidPath(_) => Self::InvalidParams(error.to_string()),
            ClientError::Encode(_) => Self::Internal(error.to_string()),
            ClientError::NoLiveVersion(_) | ClientError::Api { .. } => Self::Api(error.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
