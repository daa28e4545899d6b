// crates/gtm-core/src/parameters.rs
// ============================================================================
// Module: GTM Parameter Builder
// Description: Typed GTM parameter and filter trees with pure constructors.
// Purpose: Assemble GTM API v2 parameter grammar from validated scalars.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! GTM configures tags, triggers, and variables through a recursive
//! `type/key/value|list|map` parameter tree. [`Parameter`] models that tree
//! with an optional key and exactly one payload slot. The payload is a
//! [`ParameterContent`] variant, so a parameter cannot hold both a value and
//! a list. Builders here never validate beyond the structural checks they
//! document; callers run the validator library first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::constants::EVENT_VARIABLE_REFERENCE;
use crate::constants::ParameterType;
use crate::errors::ParameterFormatError;
use crate::validation::json_type_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key GTM reads vertical scroll thresholds from.
pub const SCROLL_PERCENTAGE_LIST_KEY: &str = "verticalScrollPercentageList";
/// Default subject for click filters.
pub const CLICK_URL_REFERENCE: &str = "{{Click URL}}";

// ============================================================================
// SECTION: Types
// ============================================================================

/// One node of the GTM parameter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter kind.
    #[serde(rename = "type")]
    pub kind: ParameterType,
    /// Parameter key; absent for list items and trigger references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Payload slot matching `kind`.
    #[serde(flatten)]
    pub content: ParameterContent,
}

/// Payload slot of a [`Parameter`], serialized as `value`, `list`, or `map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterContent {
    /// Scalar value for template, boolean, integer, and reference kinds.
    Value(String),
    /// Ordered child parameters.
    List(Vec<Parameter>),
    /// Keyed child parameters.
    Map(Vec<Parameter>),
}

impl Parameter {
    /// Returns the key when present.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the scalar value when this is a scalar parameter.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match &self.content {
            ParameterContent::Value(value) => Some(value),
            ParameterContent::List(_) | ParameterContent::Map(_) => None,
        }
    }

    /// Returns the children of a list parameter.
    #[must_use]
    pub fn list(&self) -> Option<&[Self]> {
        match &self.content {
            ParameterContent::List(items) => Some(items),
            ParameterContent::Value(_) | ParameterContent::Map(_) => None,
        }
    }

    /// Returns the children of a map parameter.
    #[must_use]
    pub fn map(&self) -> Option<&[Self]> {
        match &self.content {
            ParameterContent::Map(entries) => Some(entries),
            ParameterContent::Value(_) | ParameterContent::List(_) => None,
        }
    }

    /// Returns true when the payload slot agrees with the declared kind.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        match (&self.content, self.kind) {
            (ParameterContent::Value(_), kind) => kind.is_scalar(),
            (ParameterContent::List(_), ParameterType::List) => true,
            (ParameterContent::Map(_), ParameterType::Map) => true,
            _ => false,
        }
    }
}

/// Two-argument filter condition (`arg0` compared against `arg1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Comparison operator code, passed through as supplied.
    #[serde(rename = "type")]
    pub filter_type: String,
    /// Subject (`arg0`) and comparison literal (`arg1`).
    pub parameter: [Parameter; 2],
}

impl Filter {
    /// Builds a filter comparing `subject` against `literal`.
    #[must_use]
    pub fn condition(match_type: &str, subject: &str, literal: &str) -> Self {
        Self {
            filter_type: match_type.to_string(),
            parameter: [template_parameter("arg0", subject), template_parameter("arg1", literal)],
        }
    }

    /// Returns the comparison literal (`arg1`).
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.parameter[1].value()
    }
}

/// GA4 event parameter record (`name` / `value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParameter {
    /// Parameter name.
    pub name: String,
    /// Parameter value template.
    pub value: String,
}

impl EventParameter {
    /// Creates an event parameter record.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Scalar Builders
// ============================================================================

/// Builds a keyed TEMPLATE parameter.
#[must_use]
pub fn template_parameter(key: &str, value: impl Display) -> Parameter {
    scalar(ParameterType::Template, Some(key), value.to_string())
}

/// Builds a keyed BOOLEAN parameter stored as `"true"` or `"false"`.
#[must_use]
pub fn boolean_parameter(key: &str, value: bool) -> Parameter {
    scalar(ParameterType::Boolean, Some(key), value.to_string())
}

/// Builds a keyed INTEGER parameter stored in decimal form.
#[must_use]
pub fn integer_parameter(key: &str, value: i64) -> Parameter {
    scalar(ParameterType::Integer, Some(key), value.to_string())
}

/// Builds a keyed TAG_REFERENCE parameter pointing at a tag by name.
#[must_use]
pub fn tag_reference_parameter(key: &str, tag_name: &str) -> Parameter {
    scalar(ParameterType::TagReference, Some(key), tag_name.to_string())
}

/// Builds an unkeyed TRIGGER_REFERENCE parameter.
#[must_use]
pub fn trigger_reference_parameter(trigger_id: impl Display) -> Parameter {
    scalar(ParameterType::TriggerReference, None, trigger_id.to_string())
}

/// Shared constructor for scalar parameters.
fn scalar(kind: ParameterType, key: Option<&str>, value: String) -> Parameter {
    Parameter {
        kind,
        key: key.map(str::to_string),
        content: ParameterContent::Value(value),
    }
}

// ============================================================================
// SECTION: Collection Builders
// ============================================================================

/// Builds a keyed LIST parameter.
#[must_use]
pub fn list_parameter(key: &str, items: Vec<Parameter>) -> Parameter {
    Parameter {
        kind: ParameterType::List,
        key: Some(key.to_string()),
        content: ParameterContent::List(items),
    }
}

/// Builds an unkeyed MAP parameter.
#[must_use]
pub fn map_parameter(entries: Vec<Parameter>) -> Parameter {
    Parameter {
        kind: ParameterType::Map,
        key: None,
        content: ParameterContent::Map(entries),
    }
}

/// Builds the MAP representation of one GA4 event parameter.
#[must_use]
pub fn event_parameter(name: &str, value: &str) -> Parameter {
    map_parameter(vec![template_parameter("name", name), template_parameter("value", value)])
}

/// Maps [`event_parameter`] over records, preserving input order.
#[must_use]
pub fn event_parameters_list(parameters: &[EventParameter]) -> Vec<Parameter> {
    parameters.iter().map(|param| event_parameter(&param.name, &param.value)).collect()
}

/// Builds the vertical scroll threshold list in caller order.
///
/// Thresholds are not validated or sorted here; run
/// [`crate::validation::validate_scroll_percentages`] first.
#[must_use]
pub fn scroll_percentage_list_parameter<T: Display>(percentages: &[T]) -> Parameter {
    let items = percentages
        .iter()
        .map(|pct| scalar(ParameterType::Template, None, pct.to_string()))
        .collect();
    list_parameter(SCROLL_PERCENTAGE_LIST_KEY, items)
}

// ============================================================================
// SECTION: Filter Builders
// ============================================================================

/// Builds a Custom Event filter on `{{_event}}` for a trimmed event name.
///
/// # Errors
///
/// Returns [`ParameterFormatError`] when the name is empty or blank.
pub fn custom_event_filter(event_name: &str, match_type: &str) -> Result<Vec<Filter>, ParameterFormatError> {
    if event_name.is_empty() {
        return Err(ParameterFormatError::new("Event name cannot be empty")
            .with_parameter_key("event_name")
            .with_expected_structure("non-empty string"));
    }
    let trimmed = event_name.trim();
    if trimmed.is_empty() {
        return Err(ParameterFormatError::new("Event name cannot be empty or whitespace only")
            .with_parameter_key("event_name")
            .with_expected_structure("non-empty string with non-whitespace characters"));
    }
    Ok(vec![Filter::condition(match_type, EVENT_VARIABLE_REFERENCE, trimmed)])
}

/// Builds a Custom Event filter from a decoded value.
///
/// # Errors
///
/// Returns [`ParameterFormatError`] when the value is not a string or fails
/// [`custom_event_filter`].
pub fn custom_event_filter_value(
    event_name: &Value,
    match_type: &str,
) -> Result<Vec<Filter>, ParameterFormatError> {
    match event_name {
        Value::String(name) => custom_event_filter(name, match_type),
        Value::Null => custom_event_filter("", match_type),
        other => Err(ParameterFormatError::new(format!(
            "Event name must be a string, got {}",
            json_type_name(other)
        ))
        .with_parameter_key("event_name")
        .with_expected_structure("string")),
    }
}

/// Builds a filter matching `variable_ref` against `pattern`.
#[must_use]
pub fn url_filter(variable_ref: &str, match_type: &str, pattern: &str) -> Vec<Filter> {
    vec![Filter::condition(match_type, variable_ref, pattern)]
}

/// Builds a click filter; the subject defaults to `{{Click URL}}`.
#[must_use]
pub fn click_filter(match_type: &str, pattern: &str, click_property: Option<&str>) -> Vec<Filter> {
    let subject = click_property.unwrap_or(CLICK_URL_REFERENCE);
    vec![Filter::condition(match_type, subject, pattern)]
}

// ============================================================================
// SECTION: Merging
// ============================================================================

/// Merges parameter lists.
///
/// Keyed parameters come first: a later list overrides an earlier one with
/// the same key, and the merged entry keeps the position where that key first
/// appeared. Unkeyed parameters are never deduplicated and follow the keyed
/// ones in their original relative order. An empty-string key is a key.
#[must_use]
pub fn merge_parameters<'a>(lists: impl IntoIterator<Item = &'a [Parameter]>) -> Vec<Parameter> {
    let mut keyed: Vec<Parameter> = Vec::new();
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    let mut unkeyed: Vec<Parameter> = Vec::new();
    for list in lists {
        for param in list {
            match &param.key {
                Some(key) => {
                    if let Some(index) = positions.get(key) {
                        keyed[*index] = param.clone();
                    } else {
                        positions.insert(key.clone(), keyed.len());
                        keyed.push(param.clone());
                    }
                }
                None => unkeyed.push(param.clone()),
            }
        }
    }
    keyed.extend(unkeyed);
    keyed
}

// ============================================================================
// SECTION: Tests
// ============================================================================
