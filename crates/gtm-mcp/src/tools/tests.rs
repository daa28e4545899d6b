// crates/gtm-mcp/src/tools/tests.rs
// ============================================================================
// Module: Tool Router Tests
// Description: Dispatch, restriction, and summary tests over a fake transport.
// Purpose: Pin request shapes and error mapping without network access.
// Dependencies: gtm-mcp, serde_json
// ============================================================================

//! ## Overview
//! A recording transport answers each request from a closure so tests can
//! assert both the outgoing request and the summarized tool result.

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

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use serde_json::json;

use super::ToolError;
use super::ToolRouter;
use crate::client::ApiError;
use crate::client::ApiRequest;
use crate::client::GtmApi;
use crate::client::GtmTransport;
use crate::client::HttpMethod;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Closure answering fake API requests.
type Responder = Box<dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync>;

/// Transport that records requests and answers from a closure.
struct FakeTransport {
    /// Requests in call order.
    requests: Mutex<Vec<ApiRequest>>,
    /// Response source.
    respond: Responder,
}

impl GtmTransport for FakeTransport {
    fn execute(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

impl FakeTransport {
    /// Returns the recorded requests.
    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Builds a router over a fake transport.
fn router<F>(restricted: Option<&str>, respond: F) -> (ToolRouter, Arc<FakeTransport>)
where
    F: Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
{
    let transport = Arc::new(FakeTransport {
        requests: Mutex::new(Vec::new()),
        respond: Box::new(respond),
    });
    let api = GtmApi::new(transport.clone(), restricted.map(str::to_string));
    (ToolRouter::new(api), transport)
}

/// Workspace path used across tests.
const WORKSPACE: &str = "accounts/1234567890/containers/55/workspaces/7";

// ============================================================================
// SECTION: Routing
// ============================================================================

/// Verifies unknown tool names are rejected before any request.
#[test]
fn unknown_tool_is_rejected() {
    let (router, transport) = router(None, |_| Ok(json!({})));
    let err = router.handle_tool_call("gtm_delete_account", json!({})).unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(name) if name == "gtm_delete_account"));
    assert!(transport.requests().is_empty());
}

/// Verifies closed argument structs reject unknown keys.
#[test]
fn unknown_argument_is_invalid_params() {
    let (router, _) = router(None, |_| Ok(json!({})));
    let err = router
        .handle_tool_call("gtm_get_tag", json!({"tag_path": "accounts/1/x/tags/1", "extra": 1}))
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParams(_)));
}

/// Verifies null arguments decode as an empty object.
#[test]
fn null_arguments_are_accepted_for_argumentless_tools() {
    let (router, _) = router(None, |_| Ok(json!({"account": []})));
    let result = router.handle_tool_call("gtm_list_accounts", Value::Null).unwrap();
    assert_eq!(result, json!({"accounts": []}));
}

/// Verifies path validation errors carry structured detail.
#[test]
fn invalid_path_is_validation_error_with_data() {
    let (router, transport) = router(None, |_| Ok(json!({})));
    let err = router.handle_tool_call("gtm_get_tag", json!({"tag_path": "containers/1"})).unwrap_err();
    let data = err.data().unwrap();
    assert!(matches!(err, ToolError::Validation(_)));
    assert_eq!(data["field"], "path");
    assert!(transport.requests().is_empty());
}

/// Verifies a malformed workspace path is a structural error.
#[test]
fn short_workspace_path_is_structure_error() {
    let (router, _) = router(None, |_| Ok(json!({})));
    let err = router
        .handle_tool_call(
            "gtm_list_triggers",
            json!({"workspace_path": "accounts/1234567890/containers/55/workspaces"}),
        )
        .unwrap_err();
    assert!(matches!(err, ToolError::Structure(_)));
}

// ============================================================================
// SECTION: Account Restriction
// ============================================================================

/// Verifies account listings are filtered to the restricted account.
#[test]
fn list_accounts_filters_to_restricted_account() {
    let (router, _) = router(Some("1234567890"), |_| {
        Ok(json!({"account": [
            {"accountId": "1234567890", "name": "Main", "path": "accounts/1234567890", "fingerprint": "f"},
            {"accountId": "9999999999", "name": "Other", "path": "accounts/9999999999"}
        ]}))
    });
    let result = router.handle_tool_call("gtm_list_accounts", json!({})).unwrap();
    assert_eq!(
        result,
        json!({"accounts": [{"accountId": "1234567890", "name": "Main", "path": "accounts/1234567890"}]})
    );
}

/// Verifies a restricted account missing from the listing is a permission error.
#[test]
fn list_accounts_fails_when_restricted_account_is_not_accessible() {
    let (router, _) = router(Some("1234567890"), |_| Ok(json!({"account": []})));
    let err = router.handle_tool_call("gtm_list_accounts", json!({})).unwrap_err();
    match err {
        ToolError::Permission(message) => {
            assert!(message.starts_with("Account ID 1234567890 not found in accessible accounts."));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Verifies paths outside the restricted account never reach the transport.
#[test]
fn restriction_blocks_other_accounts() {
    let (router, transport) = router(Some("1111111111"), |_| Ok(json!({})));
    let err = router
        .handle_tool_call(
            "gtm_get_tag",
            json!({"tag_path": "accounts/2222222222/containers/1/workspaces/1/tags/3"}),
        )
        .unwrap_err();
    match err {
        ToolError::Permission(message) => assert_eq!(
            message,
            "Access denied: This GTM MCP instance is restricted to account ID 1111111111. \
             Requested account: 2222222222"
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(transport.requests().is_empty());
}

/// Verifies container listings check the account argument.
#[test]
fn list_containers_checks_restriction_and_summarizes() {
    let (router, transport) = router(Some("1234567890"), |_| {
        Ok(json!({"container": [
            {"containerId": "55", "name": "Web", "path": "accounts/1234567890/containers/55", "publicId": "GTM-AAAA", "usageContext": ["web"]}
        ]}))
    });
    let result = router.handle_tool_call("gtm_list_containers", json!({"account_id": "1234567890"})).unwrap();
    assert_eq!(result["containers"][0]["publicId"], "GTM-AAAA");
    assert!(result["containers"][0].get("usageContext").is_none());
    assert_eq!(transport.requests()[0].path, "accounts/1234567890/containers");

    let err = router.handle_tool_call("gtm_list_containers", json!({"account_id": "9999999999"})).unwrap_err();
    assert!(matches!(err, ToolError::Permission(_)));
}

// ============================================================================
// SECTION: Tags
// ============================================================================

/// Verifies `gtm_list_tags` falls back to the first workspace.
#[test]
fn list_tags_uses_first_workspace() {
    let (router, transport) = router(None, |request| {
        if request.path.ends_with("/workspaces") {
            Ok(json!({"workspace": [{"path": WORKSPACE}, {"path": "ignored"}]}))
        } else {
            Ok(json!({"tag": [{"tagId": "5", "name": "T", "type": "html", "path": "p", "parameter": []}]}))
        }
    });
    let result = router
        .handle_tool_call("gtm_list_tags", json!({"container_path": "accounts/1234567890/containers/55"}))
        .unwrap();
    assert_eq!(result, json!({"tags": [{"tagId": "5", "name": "T", "type": "html", "path": "p"}]}));
    let paths: Vec<String> = transport.requests().into_iter().map(|request| request.path).collect();
    assert_eq!(paths, vec![
        "accounts/1234567890/containers/55/workspaces".to_string(),
        format!("{WORKSPACE}/tags"),
    ]);
}

/// Verifies an explicit workspace id skips the workspace lookup.
#[test]
fn list_tags_with_workspace_id_targets_it_directly() {
    let (router, transport) = router(None, |_| Ok(json!({})));
    let result = router
        .handle_tool_call(
            "gtm_list_tags",
            json!({"container_path": "accounts/1234567890/containers/55", "workspace_id": "7"}),
        )
        .unwrap();
    assert_eq!(result, json!({"tags": []}));
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(transport.requests()[0].path, format!("{WORKSPACE}/tags"));
}

/// Verifies a container without workspaces fails.
#[test]
fn list_tags_without_workspaces_fails() {
    let (router, _) = router(None, |_| Ok(json!({"workspace": []})));
    let err = router
        .handle_tool_call("gtm_list_tags", json!({"container_path": "accounts/1234567890/containers/55"}))
        .unwrap_err();
    assert_eq!(err.to_string(), "No workspaces found in container");
}

/// Verifies GA4 event tags are assembled and posted.
#[test]
fn ga4_event_tag_posts_assembled_body() {
    let (router, transport) = router(None, |request| {
        Ok(json!({"tagId": "12", "name": request.body.as_ref().unwrap()["name"], "path": "p"}))
    });
    let result = router
        .handle_tool_call(
            "gtm_create_ga4_event_tag",
            json!({
                "workspace_path": WORKSPACE,
                "tag_name": "GA4 - purchase",
                "config_tag_name": "GA4 Config",
                "event_name": "purchase",
                "event_parameters": [{"name": "currency", "value": "USD"}],
                "firing_trigger_ids": ["4"]
            }),
        )
        .unwrap();
    assert_eq!(result, json!({"success": true, "tag": {"tagId": "12", "name": "GA4 - purchase", "path": "p"}}));
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, format!("{WORKSPACE}/tags"));
    let body = request.body.as_ref().unwrap();
    assert_eq!(body["type"], "gaawe");
    assert_eq!(body["firingTriggerId"], json!(["4"]));
    assert_eq!(body["parameter"].as_array().unwrap().len(), 3);
    assert_eq!(body["parameter"][0], json!({"type": "TAG_REFERENCE", "key": "measurementId", "value": "GA4 Config"}));
}

/// Verifies GA4 event names are validated before any request.
#[test]
fn ga4_event_tag_rejects_leading_digit_event_name() {
    let (router, transport) = router(None, |_| Ok(json!({})));
    let err = router
        .handle_tool_call(
            "gtm_create_ga4_event_tag",
            json!({
                "workspace_path": WORKSPACE,
                "tag_name": "bad",
                "config_tag_name": "GA4 Config",
                "event_name": "1purchase"
            }),
        )
        .unwrap_err();
    assert!(matches!(err, ToolError::Validation(_)));
    assert!(transport.requests().is_empty());
}

/// Verifies `gtm_update_tag` forwards the body and summarizes the result.
#[test]
fn update_tag_puts_body() {
    let (router, transport) = router(None, |request| Ok(request.body.clone().unwrap()));
    let tag_path = format!("{WORKSPACE}/tags/5");
    let result = router
        .handle_tool_call(
            "gtm_update_tag",
            json!({"tag_path": tag_path, "tag_data": {"tagId": "5", "name": "Renamed", "path": tag_path}}),
        )
        .unwrap();
    assert_eq!(result["tag"]["name"], "Renamed");
    assert_eq!(transport.requests()[0].method, HttpMethod::Put);
}

// ============================================================================
// SECTION: Triggers and Variables
// ============================================================================

/// Verifies custom event triggers carry the generated filter.
#[test]
fn custom_event_trigger_posts_generated_filter() {
    let (router, transport) = router(None, |_| {
        Ok(json!({"triggerId": "9", "name": "Purchase", "type": "customEvent", "path": "p", "fingerprint": "x"}))
    });
    let result = router
        .handle_tool_call(
            "gtm_create_trigger",
            json!({
                "workspace_path": WORKSPACE,
                "trigger_name": "Purchase",
                "trigger_type": "customEvent",
                "custom_event_name": " purchase "
            }),
        )
        .unwrap();
    assert_eq!(
        result,
        json!({"success": true, "trigger": {"triggerId": "9", "name": "Purchase", "type": "customEvent", "path": "p"}})
    );
    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["type"], "customEvent");
    assert_eq!(body["customEventFilter"][0]["parameter"][0]["value"], "{{_event}}");
    assert_eq!(body["customEventFilter"][0]["parameter"][1]["value"], "purchase");
}

/// Verifies a custom event trigger without a filter source fails.
#[test]
fn custom_event_trigger_without_filter_is_structure_error() {
    let (router, transport) = router(None, |_| Ok(json!({})));
    let err = router
        .handle_tool_call(
            "gtm_create_trigger",
            json!({"workspace_path": WORKSPACE, "trigger_name": "T", "trigger_type": "CUSTOM_EVENT"}),
        )
        .unwrap_err();
    assert!(matches!(err, ToolError::Structure(_)));
    assert_eq!(err.data().unwrap()["parameter_key"], "customEventFilter");
    assert!(transport.requests().is_empty());
}

/// Verifies scroll triggers are normalized before posting.
#[test]
fn scroll_trigger_posts_sorted_thresholds() {
    let (router, transport) = router(None, |_| Ok(json!({"triggerId": "3"})));
    router
        .handle_tool_call(
            "gtm_create_scroll_trigger",
            json!({"workspace_path": WORKSPACE, "trigger_name": "Scroll", "percentages": [90, 25, 25]}),
        )
        .unwrap();
    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["type"], "scrollDepth");
    let values: Vec<&str> = body["verticalScrollPercentageList"]["list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["25", "90"]);
}

/// Verifies data layer variables are posted with their typed layout.
#[test]
fn data_layer_variable_posts_version_parameter() {
    let (router, transport) = router(None, |_| {
        Ok(json!({"variableId": "8", "name": "DLV", "type": "v", "path": "p"}))
    });
    let result = router
        .handle_tool_call(
            "gtm_create_variable",
            json!({
                "workspace_path": WORKSPACE,
                "variable_name": "DLV",
                "variable_type": "v",
                "variable_config": {"data_layer_name": "ecommerce.value"}
            }),
        )
        .unwrap();
    assert_eq!(result["variable"]["variableId"], "8");
    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["parameter"][1], json!({"type": "INTEGER", "key": "dataLayerVersion", "value": "2"}));
}

// ============================================================================
// SECTION: Versions
// ============================================================================

/// Verifies publishing creates a version and publishes its path.
#[test]
fn publish_container_creates_then_publishes() {
    let (router, transport) = router(None, |request| {
        if request.path.ends_with(":create_version") {
            Ok(json!({"containerVersion": {"path": "accounts/1234567890/containers/55/versions/3"}}))
        } else {
            Ok(json!({"containerVersion": {"containerVersionId": "3", "name": "v1"}}))
        }
    });
    let result = router
        .handle_tool_call(
            "gtm_publish_container",
            json!({"workspace_path": WORKSPACE, "version_name": "v1"}),
        )
        .unwrap();
    assert_eq!(
        result,
        json!({"success": true, "version": {"versionId": "3", "name": "v1", "published": true}})
    );
    let requests = transport.requests();
    assert_eq!(requests[0].path, format!("{WORKSPACE}:create_version"));
    assert_eq!(requests[0].body, Some(json!({"name": "v1", "notes": ""})));
    assert_eq!(requests[1].path, "accounts/1234567890/containers/55/versions/3:publish");
    assert_eq!(requests[1].method, HttpMethod::Post);
}

/// Verifies publishing stops when the created version has no path.
#[test]
fn publish_container_requires_created_version_path() {
    let (router, transport) = router(None, |_| Ok(json!({"compilerError": true})));
    let err = router
        .handle_tool_call(
            "gtm_publish_container",
            json!({"workspace_path": WORKSPACE, "version_name": "v1", "version_notes": "n"}),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to create version");
    assert_eq!(transport.requests().len(), 1);
}

/// Verifies version listing sends the include-deleted flag.
#[test]
fn list_versions_sends_include_deleted() {
    let (router, transport) = router(None, |_| {
        Ok(json!({"containerVersionHeader": [
            {"containerVersionId": "2", "name": "old", "path": "p2", "deleted": true, "numTags": "4"}
        ]}))
    });
    let result = router
        .handle_tool_call(
            "gtm_list_versions",
            json!({"container_path": "accounts/1234567890/containers/55", "include_deleted": true}),
        )
        .unwrap();
    assert_eq!(
        result,
        json!({"versions": [{"containerVersionId": "2", "name": "old", "path": "p2", "deleted": true}]})
    );
    let request = &transport.requests()[0];
    assert_eq!(request.path, "accounts/1234567890/containers/55/version_headers");
    assert_eq!(request.query, vec![("includeDeleted".to_string(), "true".to_string())]);
}

/// Verifies a missing live version maps to a publish hint.
#[test]
fn live_version_not_found_suggests_publishing() {
    let (router, _) = router(None, |_| {
        Err(ApiError::Status {
            status: 404,
            message: "Not found".to_string(),
        })
    });
    let err = router
        .handle_tool_call("gtm_get_live_version", json!({"container_path": "accounts/1234567890/containers/55"}))
        .unwrap_err();
    assert!(matches!(err, ToolError::Api(_)));
    assert_eq!(
        err.to_string(),
        "No published version found for container accounts/1234567890/containers/55. Publish a \
         version first using gtm_publish_container."
    );
}

/// Verifies API failures are labeled with the operation.
#[test]
fn api_failures_name_the_operation() {
    let (router, _) = router(None, |_| {
        Err(ApiError::Status {
            status: 403,
            message: "denied".to_string(),
        })
    });
    let err = router.handle_tool_call("gtm_list_triggers", json!({"workspace_path": WORKSPACE})).unwrap_err();
    assert_eq!(err.to_string(), "Failed to list triggers: HTTP 403: denied");
}

/// Verifies delete reports the deleted path.
#[test]
fn delete_version_reports_path() {
    let (router, transport) = router(None, |_| Ok(Value::Null));
    let path = "accounts/1234567890/containers/55/versions/3";
    let result = router.handle_tool_call("gtm_delete_version", json!({"version_path": path})).unwrap();
    assert_eq!(
        result,
        json!({"success": true, "message": format!("Version deleted successfully: {path}")})
    );
    assert_eq!(transport.requests()[0].method, HttpMethod::Delete);
}

/// Verifies undelete and set-latest summarize the nested version.
#[test]
fn version_verbs_summarize_nested_version() {
    let (router, transport) = router(None, |_| {
        Ok(json!({"containerVersion": {"containerVersionId": "3", "name": "v1", "path": "p", "tag": []}}))
    });
    let path = "accounts/1234567890/containers/55/versions/3";
    let expected = json!({"success": true, "version": {"containerVersionId": "3", "name": "v1", "path": "p"}});
    assert_eq!(router.handle_tool_call("gtm_undelete_version", json!({"version_path": path})).unwrap(), expected);
    assert_eq!(router.handle_tool_call("gtm_set_latest_version", json!({"version_path": path})).unwrap(), expected);
    let paths: Vec<String> = transport.requests().into_iter().map(|request| request.path).collect();
    assert_eq!(paths, vec![format!("{path}:undelete"), format!("{path}:set_latest")]);
}
