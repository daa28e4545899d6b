// crates/gtm-core/src/assembly.rs
// ============================================================================
// Module: GTM Entity Assembly
// Description: Entity-level builders for tags, triggers, variables, versions.
// Purpose: Compose validators and parameter builders into API payloads.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Assembly functions take caller requests, validate each field, and return
//! draft payloads shaped exactly like GTM API v2 request bodies. Custom Event
//! filter precedence lives in one ordered table,
//! [`CUSTOM_EVENT_FILTER_PRECEDENCE`], so the order can be read and tested in
//! one place.
//!
//! Security posture: request contents are untrusted; every free-form field is
//! validated before it reaches a payload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::constants::GTM_NAME_MAX_LENGTH;
use crate::constants::TAG_TYPE_GA4_CONFIG;
use crate::constants::TAG_TYPE_GA4_EVENT;
use crate::constants::TagType;
use crate::constants::TriggerType;
use crate::constants::VARIABLE_TYPE_CONSTANT;
use crate::constants::VARIABLE_TYPE_CUSTOM_JAVASCRIPT;
use crate::constants::VARIABLE_TYPE_DATA_LAYER;
use crate::constants::VARIABLE_TYPE_FIRST_PARTY_COOKIE;
use crate::constants::VARIABLE_TYPE_URL;
use crate::constants::VARIABLE_TYPE_USER_PROVIDED_DATA;
use crate::constants::VariableType;
use crate::errors::GtmError;
use crate::errors::ParameterFormatError;
use crate::errors::ValidationError;
use crate::parameters::EventParameter;
use crate::parameters::Filter;
use crate::parameters::Parameter;
use crate::parameters::boolean_parameter;
use crate::parameters::custom_event_filter;
use crate::parameters::custom_event_filter_value;
use crate::parameters::event_parameters_list;
use crate::parameters::integer_parameter;
use crate::parameters::list_parameter;
use crate::parameters::map_parameter;
use crate::parameters::merge_parameters;
use crate::parameters::scroll_percentage_list_parameter;
use crate::parameters::tag_reference_parameter;
use crate::parameters::template_parameter;
use crate::parameters::trigger_reference_parameter;
use crate::validation::json_type_name;
use crate::validation::template_text;
use crate::validation::validate_name;
use crate::validation::validate_notes;
use crate::validation::validate_positive_integer;
use crate::validation::validate_scroll_percentages;
use crate::validation::validate_trigger_ids;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Match type used by the legacy `event_name` trigger config when none is set.
///
/// Lower case on purpose: it is forwarded as supplied and never normalized.
pub const LEGACY_MATCH_TYPE: &str = "equals";

/// Match type used for `custom_event_name`.
pub const DEFAULT_MATCH_TYPE: &str = "EQUALS";

/// Trigger config keys copied verbatim into the trigger payload.
pub const TRIGGER_API_FIELDS: &[&str] = &[
    "filter",
    "autoEventFilter",
    "customEventFilter",
    "waitForTags",
    "visibilitySelector",
    "visiblePercentageMin",
    "continuousTimeMinMilliseconds",
    "visiblePercentageMax",
    "maxTimerLengthSeconds",
    "checkValidation",
    "waitForTagsTimeout",
    "uniqueTriggerId",
    "horizontalScrollPercentageList",
    "verticalScrollPercentageList",
    "totalTimeMinMilliseconds",
    "interval",
    "intervalSeconds",
    "limit",
    "videoPercentageList",
    "triggerStartDelay",
    "elementId",
    "selector",
    "notes",
    "parameter",
    "eventName",
];

/// User-provided data fields copied into `awec` variables, in emit order.
pub const USER_PROVIDED_DATA_FIELDS: &[&str] = &[
    "email",
    "phone_number",
    "first_name",
    "last_name",
    "street",
    "city",
    "region",
    "postal_code",
    "country",
];

/// Error message for Custom Event triggers without any filter source.
const MISSING_CUSTOM_EVENT_FILTER: &str =
    "Custom Event triggers require either a direct event name or an explicit filter.";

// ============================================================================
// SECTION: Draft Types
// ============================================================================

/// Parameter list that is either assembled here or forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityParameters {
    /// Parameters assembled by the builder.
    Built(Vec<Parameter>),
    /// Caller-supplied JSON forwarded untouched.
    Verbatim(Value),
}

/// Custom Event filter that is either assembled here or forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventFilters {
    /// Filters assembled by the builder.
    Built(Vec<Filter>),
    /// Caller-supplied JSON forwarded untouched.
    Verbatim(Value),
}

/// Tag request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDraft {
    /// Tag name.
    pub name: String,
    /// Tag type code.
    #[serde(rename = "type")]
    pub tag_type: TagType,
    /// Tag parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<Parameter>>,
    /// Trigger ids that fire the tag.
    #[serde(rename = "firingTriggerId", skip_serializing_if = "Option::is_none")]
    pub firing_trigger_id: Option<Vec<String>>,
}

/// Trigger request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerDraft {
    /// Trigger name.
    pub name: String,
    /// Trigger type, as the caller spelled it.
    #[serde(rename = "type")]
    pub trigger_type: String,
    /// Custom Event filter.
    #[serde(rename = "customEventFilter", skip_serializing_if = "Option::is_none")]
    pub custom_event_filter: Option<EventFilters>,
    /// Trigger parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<EntityParameters>,
    /// Assembled vertical scroll thresholds.
    #[serde(rename = "verticalScrollPercentageList", skip_serializing_if = "Option::is_none")]
    pub vertical_scroll_percentage_list: Option<Parameter>,
    /// Remaining GTM API fields copied from the trigger config.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

/// Variable request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDraft {
    /// Variable name.
    pub name: String,
    /// Variable type code.
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    /// Variable parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Vec<Parameter>>,
}

/// Container version request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDraft {
    /// Version name.
    pub name: String,
    /// Version notes.
    pub notes: String,
}

// ============================================================================
// SECTION: Request Types
// ============================================================================

/// Caller input for a generic tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagRequest {
    /// Tag name.
    pub tag_name: String,
    /// Tag type code.
    pub tag_type: String,
    /// Generic tag configuration.
    #[serde(default)]
    pub tag_config: Option<Map<String, Value>>,
    /// Firing trigger ids, validated as a list of strings.
    #[serde(default)]
    pub firing_trigger_ids: Option<Value>,
}

/// Caller input for a trigger.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerRequest {
    /// Trigger name.
    pub trigger_name: String,
    /// Trigger type as a registry code or GTM REST spelling.
    pub trigger_type: String,
    /// Convenience event name for Custom Event triggers.
    #[serde(default)]
    pub custom_event_name: Option<String>,
    /// Generic trigger configuration.
    #[serde(default)]
    pub trigger_config: Option<Map<String, Value>>,
}

/// Caller input for a variable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableRequest {
    /// Variable name.
    pub variable_name: String,
    /// Variable type code.
    pub variable_type: String,
    /// Type-specific variable configuration.
    #[serde(default)]
    pub variable_config: Option<Map<String, Value>>,
}

impl TriggerRequest {
    /// Looks up a key in the trigger config.
    fn config(&self, key: &str) -> Option<&Value> {
        self.trigger_config.as_ref().and_then(|config| config.get(key))
    }
}

// ============================================================================
// SECTION: GA4 Tags
// ============================================================================

/// Builds a GA4 configuration tag.
///
/// Base parameters are `measurementId` and `sendPageView`;
/// `additional_params` are merged over them with [`merge_parameters`].
#[must_use]
pub fn build_ga4_config_tag(
    name: &str,
    measurement_id: &str,
    send_page_view: bool,
    additional_params: &[Parameter],
) -> TagDraft {
    let base = vec![
        template_parameter("measurementId", measurement_id),
        boolean_parameter("sendPageView", send_page_view),
    ];
    let parameter = if additional_params.is_empty() {
        base
    } else {
        merge_parameters([base.as_slice(), additional_params])
    };
    TagDraft {
        name: name.to_string(),
        tag_type: TagType::known(TAG_TYPE_GA4_CONFIG),
        parameter: Some(parameter),
        firing_trigger_id: None,
    }
}

/// Builds a GA4 event tag.
///
/// The parameter list always starts with the `measurementId` tag reference
/// and `eventName`. `eventParameters` is appended only when records are
/// given, and `sendEcommerceData` only when `send_ecommerce` is set.
#[must_use]
pub fn build_ga4_event_tag(
    name: &str,
    config_tag_name: &str,
    event_name: &str,
    event_parameters: &[EventParameter],
    send_ecommerce: bool,
) -> TagDraft {
    let mut parameter = vec![
        tag_reference_parameter("measurementId", config_tag_name),
        template_parameter("eventName", event_name),
    ];
    if !event_parameters.is_empty() {
        parameter.push(list_parameter("eventParameters", event_parameters_list(event_parameters)));
    }
    if send_ecommerce {
        parameter.push(boolean_parameter("sendEcommerceData", true));
    }
    TagDraft {
        name: name.to_string(),
        tag_type: TagType::known(TAG_TYPE_GA4_EVENT),
        parameter: Some(parameter),
        firing_trigger_id: None,
    }
}

// ============================================================================
// SECTION: Generic Tags
// ============================================================================

/// Builds a generic tag from a request.
///
/// # Errors
///
/// Returns [`GtmError`] when the name, type, trigger ids, or config are invalid.
pub fn build_tag(request: &TagRequest) -> Result<TagDraft, GtmError> {
    let name = validate_name(&request.tag_name, "name", GTM_NAME_MAX_LENGTH)?;
    let tag_type = TagType::new(request.tag_type.clone())?;
    let parameter = request.tag_config.as_ref().map(build_parameters_from_config).transpose()?;
    let firing_trigger_id = request.firing_trigger_ids.as_ref().map(validate_trigger_ids).transpose()?;
    Ok(TagDraft {
        name,
        tag_type,
        parameter,
        firing_trigger_id,
    })
}

/// Converts a generic config object into parameters, in key order.
///
/// Scalars become TEMPLATE parameters. Arrays of objects become a LIST of
/// MAP parameters whose entries are TEMPLATE parameters.
///
/// # Errors
///
/// Returns [`ParameterFormatError`] when an array holds a non-object item.
pub fn build_parameters_from_config(config: &Map<String, Value>) -> Result<Vec<Parameter>, ParameterFormatError> {
    let mut parameters = Vec::with_capacity(config.len());
    for (key, value) in config {
        let parameter = match value {
            Value::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    let Value::Object(entries) = item else {
                        return Err(ParameterFormatError::new(format!(
                            "List entries for '{key}' must be objects, got {}",
                            json_type_name(item)
                        ))
                        .with_parameter_key(key.clone())
                        .with_expected_structure("list of objects with scalar values"));
                    };
                    let map = entries
                        .iter()
                        .map(|(entry_key, entry_value)| {
                            template_parameter(entry_key, template_text(entry_value))
                        })
                        .collect();
                    maps.push(map_parameter(map));
                }
                list_parameter(key, maps)
            }
            other => template_parameter(key, template_text(other)),
        };
        parameters.push(parameter);
    }
    Ok(parameters)
}

// ============================================================================
// SECTION: Triggers
// ============================================================================

/// A source a Custom Event filter can be derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomEventFilterSource<'a> {
    /// The `custom_event_name` convenience field.
    EventName(&'a str),
    /// An explicit `customEventFilter` in the trigger config.
    ConfigFilter(&'a Value),
    /// The legacy `event_name` / `match_type` pair in the trigger config.
    LegacyEventName {
        /// Legacy event name value.
        event_name: &'a Value,
        /// Match type, forwarded without normalization when present.
        match_type: Option<&'a Value>,
    },
}

/// Rule that yields a filter source when its input is present.
pub type FilterSourceRule = for<'a> fn(&'a TriggerRequest) -> Option<CustomEventFilterSource<'a>>;

/// Custom Event filter sources, highest precedence first.
pub const CUSTOM_EVENT_FILTER_PRECEDENCE: [FilterSourceRule; 3] =
    [explicit_event_name_source, config_filter_source, legacy_event_name_source];

/// Yields the `custom_event_name` field.
fn explicit_event_name_source(request: &TriggerRequest) -> Option<CustomEventFilterSource<'_>> {
    request.custom_event_name.as_deref().map(CustomEventFilterSource::EventName)
}

/// Yields a config-supplied `customEventFilter`.
fn config_filter_source(request: &TriggerRequest) -> Option<CustomEventFilterSource<'_>> {
    request.config("customEventFilter").map(CustomEventFilterSource::ConfigFilter)
}

/// Yields the legacy `event_name` / `match_type` pair.
fn legacy_event_name_source(request: &TriggerRequest) -> Option<CustomEventFilterSource<'_>> {
    request.config("event_name").map(|event_name| CustomEventFilterSource::LegacyEventName {
        event_name,
        match_type: request.config("match_type"),
    })
}

/// Returns the highest-precedence Custom Event filter source present.
#[must_use]
pub fn select_custom_event_filter_source(request: &TriggerRequest) -> Option<CustomEventFilterSource<'_>> {
    CUSTOM_EVENT_FILTER_PRECEDENCE.iter().find_map(|rule| rule(request))
}

/// Builds the filter for a selected source.
fn resolve_custom_event_filter(source: CustomEventFilterSource<'_>) -> Result<EventFilters, ParameterFormatError> {
    match source {
        CustomEventFilterSource::EventName(name) => {
            custom_event_filter(name, DEFAULT_MATCH_TYPE).map(EventFilters::Built)
        }
        CustomEventFilterSource::ConfigFilter(filter) => Ok(EventFilters::Verbatim(filter.clone())),
        CustomEventFilterSource::LegacyEventName {
            event_name,
            match_type,
        } => custom_event_filter_value(event_name, legacy_match_type(match_type)?)
            .map(EventFilters::Built),
    }
}

/// Resolves the legacy match type. Absent or null means [`LEGACY_MATCH_TYPE`].
fn legacy_match_type(match_type: Option<&Value>) -> Result<&str, ParameterFormatError> {
    match match_type {
        None | Some(Value::Null) => Ok(LEGACY_MATCH_TYPE),
        Some(Value::String(match_type)) => Ok(match_type),
        Some(other) => Err(ParameterFormatError::new(format!(
            "Match type must be a string, got {}",
            json_type_name(other)
        ))
        .with_parameter_key("match_type")
        .with_expected_structure("string")),
    }
}

/// Builds a trigger from a request.
///
/// Custom Event triggers take their filter from the first source in
/// [`CUSTOM_EVENT_FILTER_PRECEDENCE`]. For Trigger Group triggers, config
/// `trigger_ids` become a `triggerIds` list of trigger references that
/// replaces any config `parameter`. For Scroll Depth triggers, config
/// `scroll_percentages` are validated and replace any raw
/// `verticalScrollPercentageList`. Other [`TRIGGER_API_FIELDS`] are copied
/// verbatim.
///
/// # Errors
///
/// Returns [`GtmError`] when a field is invalid or a Custom Event trigger has
/// no filter source.
pub fn build_trigger(request: &TriggerRequest) -> Result<TriggerDraft, GtmError> {
    let name = validate_name(&request.trigger_name, "name", GTM_NAME_MAX_LENGTH)?;
    let kind = parse_trigger_kind(&request.trigger_type)?;

    let mut fields = BTreeMap::new();
    for field in TRIGGER_API_FIELDS {
        if matches!(*field, "customEventFilter" | "parameter") {
            continue;
        }
        if let Some(value) = request.config(field) {
            fields.insert((*field).to_string(), value.clone());
        }
    }

    let custom_event_filter = if kind == TriggerType::CustomEvent {
        let source = select_custom_event_filter_source(request).ok_or_else(|| {
            ParameterFormatError::new(MISSING_CUSTOM_EVENT_FILTER)
                .with_parameter_key("customEventFilter")
                .with_expected_structure("custom_event_name or trigger_config.customEventFilter")
        })?;
        Some(resolve_custom_event_filter(source)?)
    } else if request.custom_event_name.is_some() {
        None
    } else {
        request.config("customEventFilter").cloned().map(EventFilters::Verbatim)
    };

    let parameter = match request.config("trigger_ids") {
        Some(trigger_ids) if kind == TriggerType::TriggerGroup => {
            let references = validate_trigger_ids(trigger_ids)?
                .iter()
                .map(trigger_reference_parameter)
                .collect();
            Some(EntityParameters::Built(vec![list_parameter("triggerIds", references)]))
        }
        _ => request.config("parameter").cloned().map(EntityParameters::Verbatim),
    };

    let vertical_scroll_percentage_list = match request.config("scroll_percentages") {
        Some(percentages) if kind == TriggerType::ScrollDepth => {
            let validated = validate_scroll_percentages(percentages)?;
            fields.remove("verticalScrollPercentageList");
            Some(scroll_percentage_list_parameter(&validated))
        }
        _ => None,
    };

    Ok(TriggerDraft {
        name,
        trigger_type: request.trigger_type.clone(),
        custom_event_filter,
        parameter,
        vertical_scroll_percentage_list,
        fields,
    })
}

/// Builds a Scroll Depth trigger from decoded thresholds.
///
/// # Errors
///
/// Returns [`GtmError`] when the name or thresholds are invalid.
pub fn build_scroll_depth_trigger(name: &str, percentages: &Value) -> Result<TriggerDraft, GtmError> {
    let name = validate_name(name, "name", GTM_NAME_MAX_LENGTH)?;
    let validated = validate_scroll_percentages(percentages)?;
    Ok(TriggerDraft {
        name,
        trigger_type: TriggerType::ScrollDepth.api_name().to_string(),
        custom_event_filter: None,
        parameter: None,
        vertical_scroll_percentage_list: Some(scroll_percentage_list_parameter(&validated)),
        fields: BTreeMap::new(),
    })
}

/// Resolves a registry code or GTM REST spelling to a trigger type.
fn parse_trigger_kind(trigger_type: &str) -> Result<TriggerType, ValidationError> {
    if trigger_type.is_empty() {
        return Err(ValidationError::new("Trigger type cannot be empty").with_field("trigger_type"));
    }
    TriggerType::parse_lenient(trigger_type).ok_or_else(|| {
        let valid: Vec<&str> = TriggerType::all().iter().map(|kind| kind.api_name()).collect();
        ValidationError::new(format!("Invalid trigger type: {trigger_type}"))
            .with_field("trigger_type")
            .with_value(trigger_type)
            .with_expected(format!("a registry code or one of {}", valid.join(", ")))
    })
}

// ============================================================================
// SECTION: Variables
// ============================================================================

/// Builds a variable from a request.
///
/// Known types get their dedicated parameter layout; any other type uses
/// [`build_parameters_from_config`].
///
/// # Errors
///
/// Returns [`GtmError`] when the name, type, or config are invalid.
pub fn build_variable(request: &VariableRequest) -> Result<VariableDraft, GtmError> {
    let name = validate_name(&request.variable_name, "name", GTM_NAME_MAX_LENGTH)?;
    let variable_type = VariableType::new(request.variable_type.clone())?;
    let parameter = match &request.variable_config {
        Some(config) => Some(variable_parameters(variable_type.as_str(), config)?),
        None => None,
    };
    Ok(VariableDraft {
        name,
        variable_type,
        parameter,
    })
}

/// Assembles type-specific variable parameters.
fn variable_parameters(variable_type: &str, config: &Map<String, Value>) -> Result<Vec<Parameter>, GtmError> {
    let text = |key: &str, default: &str| {
        config.get(key).map_or_else(|| default.to_string(), template_text)
    };
    let parameters = match variable_type {
        VARIABLE_TYPE_CONSTANT => vec![template_parameter("value", text("value", ""))],
        VARIABLE_TYPE_CUSTOM_JAVASCRIPT => {
            vec![template_parameter("javascript", text("javascript", ""))]
        }
        VARIABLE_TYPE_URL => vec![template_parameter("component", text("component", "URL"))],
        VARIABLE_TYPE_DATA_LAYER => {
            let version = data_layer_version(config.get("version"))?;
            vec![
                template_parameter("name", text("data_layer_name", "")),
                integer_parameter("dataLayerVersion", version),
            ]
        }
        VARIABLE_TYPE_FIRST_PARTY_COOKIE => {
            vec![template_parameter("name", text("cookie_name", ""))]
        }
        VARIABLE_TYPE_USER_PROVIDED_DATA => {
            let mut parameters = vec![template_parameter("mode", "MANUAL")];
            for field in USER_PROVIDED_DATA_FIELDS {
                if let Some(value) = config.get(*field) {
                    parameters.push(template_parameter(field, template_text(value)));
                }
            }
            parameters
        }
        _ => build_parameters_from_config(config)?,
    };
    Ok(parameters)
}

/// Reads the data layer version (1 or 2, default 2) from an int or digit string.
fn data_layer_version(value: Option<&Value>) -> Result<i64, ValidationError> {
    let normalized = match value {
        None => return Ok(2),
        Some(Value::String(text)) => text.trim().parse::<i64>().map_or_else(|_| Value::String(text.clone()), Value::from),
        Some(other) => other.clone(),
    };
    validate_positive_integer(&normalized, "version", 1, Some(2))
}

// ============================================================================
// SECTION: Versions
// ============================================================================

/// Builds a container version request.
///
/// # Errors
///
/// Returns [`ValidationError`] when the name or notes are invalid.
pub fn build_version(name: &str, notes: Option<&str>) -> Result<VersionDraft, ValidationError> {
    let name = validate_name(name, "name", GTM_NAME_MAX_LENGTH)?;
    let notes = validate_notes(notes.unwrap_or_default())?;
    Ok(VersionDraft {
        name,
        notes,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
