// crates/gtm-core/src/validation.rs
// ============================================================================
// Module: GTM Validator Library
// Description: Field-level validators for GTM and GA4 inputs.
// Purpose: Reject malformed caller input before any payload is assembled.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Each validator checks one value against one domain rule. It either returns
//! the value, normalized where the rule says so, or fails with a
//! [`ValidationError`] carrying the field, the offending value, and the
//! expected shape. Validators whose rule includes a type check take a decoded
//! JSON [`Value`]; the rest take `&str`. All of them are pure, so repeated
//! calls with the same input give the same result.
//!
//! Security posture: inputs are untrusted tool arguments.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;

use crate::constants::ACCOUNT_ID_MIN_DIGITS;
use crate::constants::FilterType;
use crate::constants::GA4_EVENT_NAME_MAX_LENGTH;
use crate::constants::GA4_PARAMETER_NAME_MAX_LENGTH;
use crate::constants::GTM_NOTES_MAX_LENGTH;
use crate::constants::TriggerType;
use crate::errors::ValidationError;
use crate::parameters::EventParameter;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Validates a GTM account identifier.
///
/// # Errors
///
/// Returns [`ValidationError`] when the id is empty, not all digits, or shorter
/// than ten digits.
pub fn validate_account_id(account_id: &str) -> Result<String, ValidationError> {
    validate_numeric_id(account_id, "Account ID", "account_id")?;
    if account_id.len() < ACCOUNT_ID_MIN_DIGITS {
        return Err(ValidationError::new("Account ID must be at least 10 digits")
            .with_field("account_id")
            .with_value(account_id));
    }
    Ok(account_id.to_string())
}

/// Validates a GTM container identifier.
///
/// # Errors
///
/// Returns [`ValidationError`] when the id is empty or not all digits.
pub fn validate_container_id(container_id: &str) -> Result<String, ValidationError> {
    validate_numeric_id(container_id, "Container ID", "container_id")?;
    Ok(container_id.to_string())
}

/// Validates a GTM workspace identifier.
///
/// # Errors
///
/// Returns [`ValidationError`] when the id is empty or not all digits.
pub fn validate_workspace_id(workspace_id: &str) -> Result<String, ValidationError> {
    validate_numeric_id(workspace_id, "Workspace ID", "workspace_id")?;
    Ok(workspace_id.to_string())
}

/// Shared empty and digit checks for numeric identifiers.
fn validate_numeric_id(value: &str, label: &str, field: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(format!("{label} cannot be empty")).with_field(field));
    }
    if !is_all_digits(value) {
        return Err(ValidationError::new(format!("{label} must contain only digits"))
            .with_field(field)
            .with_value(value)
            .with_expected("numeric string"));
    }
    Ok(())
}

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Validates a GTM resource path.
///
/// When `expected_type` is given the path must contain it as a substring.
/// This is a loose check, not segment parsing: `"version"` is satisfied by a
/// path containing `versions`, and callers rely on that.
///
/// # Errors
///
/// Returns [`ValidationError`] when the path is empty, is not rooted at
/// `accounts/`, has a non-numeric account segment, or lacks `expected_type`.
pub fn validate_gtm_path(path: &str, expected_type: Option<&str>) -> Result<String, ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("Path cannot be empty").with_field("path"));
    }
    if !path.starts_with("accounts/") {
        return Err(ValidationError::new("Path must start with 'accounts/'")
            .with_field("path")
            .with_value(path)
            .with_expected("accounts/{accountId}/..."));
    }
    let account_segment = path.split('/').nth(1).unwrap_or_default();
    if !is_all_digits(account_segment) {
        return Err(ValidationError::new("Account ID in path must be numeric")
            .with_field("path")
            .with_value(path));
    }
    if let Some(expected) = expected_type.filter(|expected| !expected.is_empty())
        && !path.contains(expected)
    {
        return Err(ValidationError::new(format!(
            "Path does not contain expected type '{expected}'"
        ))
        .with_field("path")
        .with_value(path)
        .with_expected(format!("path containing '/{expected}s/'")));
    }
    Ok(path.to_string())
}

// ============================================================================
// SECTION: Names and Notes
// ============================================================================

/// Validates an entity name and returns it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError`] when the name is empty or longer than
/// `max_length` characters.
pub fn validate_name(name: &str, field_name: &str, max_length: usize) -> Result<String, ValidationError> {
    let label = capitalize(field_name);
    if name.is_empty() {
        return Err(ValidationError::new(format!("{label} cannot be empty")).with_field(field_name));
    }
    let length = name.chars().count();
    if length > max_length {
        return Err(ValidationError::new(format!(
            "{label} exceeds maximum length of {max_length}"
        ))
        .with_field(field_name)
        .with_value(format!("{length} characters"))
        .with_expected(format!("<= {max_length} characters")));
    }
    Ok(name.trim().to_string())
}

/// Validates free-form notes. The empty string is accepted.
///
/// # Errors
///
/// Returns [`ValidationError`] when the notes exceed 5000 characters.
pub fn validate_notes(notes: &str) -> Result<String, ValidationError> {
    let length = notes.chars().count();
    if length > GTM_NOTES_MAX_LENGTH {
        return Err(ValidationError::new(format!(
            "Notes exceed maximum length of {GTM_NOTES_MAX_LENGTH}"
        ))
        .with_field("notes")
        .with_value(format!("{length} characters"))
        .with_expected(format!("<= {GTM_NOTES_MAX_LENGTH} characters")));
    }
    Ok(notes.to_string())
}

// ============================================================================
// SECTION: Type Codes
// ============================================================================

/// Validates a trigger type against the closed registry, case-sensitively.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every valid code on mismatch.
pub fn validate_trigger_type(trigger_type: &str) -> Result<TriggerType, ValidationError> {
    TriggerType::parse(trigger_type).ok_or_else(|| {
        let valid: Vec<&str> = TriggerType::all().iter().map(|kind| kind.as_str()).collect();
        ValidationError::new(format!("Invalid trigger type: {trigger_type}"))
            .with_field("trigger_type")
            .with_value(trigger_type)
            .with_expected(format!("one of {}", quoted_list(&valid)))
    })
}

/// Validates a filter operator against the closed registry, case-sensitively.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every valid code on mismatch.
pub fn validate_filter_type(filter_type: &str) -> Result<FilterType, ValidationError> {
    FilterType::parse(filter_type).ok_or_else(|| {
        let valid: Vec<&str> = FilterType::all().iter().map(|kind| kind.as_str()).collect();
        ValidationError::new(format!("Invalid filter type: {filter_type}"))
            .with_field("filter_type")
            .with_value(filter_type)
            .with_expected(format!("one of {}", quoted_list(&valid)))
    })
}

/// Validates a tag type code. Any non-empty code is accepted.
///
/// # Errors
///
/// Returns [`ValidationError`] when the code is empty.
pub fn validate_tag_type(tag_type: &str) -> Result<String, ValidationError> {
    if tag_type.is_empty() {
        return Err(ValidationError::new("Tag type cannot be empty").with_field("tag_type"));
    }
    Ok(tag_type.to_string())
}

/// Validates a variable type code. Any non-empty code is accepted.
///
/// # Errors
///
/// Returns [`ValidationError`] when the code is empty.
pub fn validate_variable_type(variable_type: &str) -> Result<String, ValidationError> {
    if variable_type.is_empty() {
        return Err(ValidationError::new("Variable type cannot be empty").with_field("variable_type"));
    }
    Ok(variable_type.to_string())
}

// ============================================================================
// SECTION: Scroll Percentages
// ============================================================================

/// Validates decoded scroll thresholds and returns them sorted and deduplicated.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value is not a list, is empty, holds a
/// non-integer, or holds a value outside `0..=100`.
pub fn validate_scroll_percentages(percentages: &Value) -> Result<Vec<u8>, ValidationError> {
    let Value::Array(items) = percentages else {
        return Err(ValidationError::new("Scroll percentages must be a list")
            .with_field("percentages")
            .with_value(json_type_name(percentages))
            .with_expected("list of integers"));
    };
    let mut values = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(value) = item.as_i64() else {
            return Err(ValidationError::new(format!(
                "Percentage at index {index} must be an integer"
            ))
            .with_field("percentages")
            .with_value(json_type_name(item))
            .with_expected("integer"));
        };
        values.push(value);
    }
    validate_scroll_percentage_list(&values)
}

/// Validates integer scroll thresholds and returns them sorted and deduplicated.
///
/// # Errors
///
/// Returns [`ValidationError`] when the list is empty or holds a value
/// outside `0..=100`.
pub fn validate_scroll_percentage_list(percentages: &[i64]) -> Result<Vec<u8>, ValidationError> {
    if percentages.is_empty() {
        return Err(ValidationError::new("Scroll percentages cannot be empty").with_field("percentages"));
    }
    let mut normalized = BTreeSet::new();
    for (index, value) in percentages.iter().enumerate() {
        let in_range = u8::try_from(*value).ok().filter(|pct| *pct <= 100);
        let Some(pct) = in_range else {
            return Err(ValidationError::new(format!(
                "Percentage at index {index} must be between 0 and 100"
            ))
            .with_field("percentages")
            .with_value(*value)
            .with_expected("0-100"));
        };
        normalized.insert(pct);
    }
    Ok(normalized.into_iter().collect())
}

// ============================================================================
// SECTION: GA4 Names
// ============================================================================

/// Validates a GA4 event name.
///
/// # Errors
///
/// Returns [`ValidationError`] when the name is empty, longer than 40
/// characters, does not start with a letter, or holds characters outside
/// `[A-Za-z0-9_]`.
pub fn validate_ga4_event_name(event_name: &str) -> Result<String, ValidationError> {
    validate_ga4_identifier(event_name, "Event name", "event_name", GA4_EVENT_NAME_MAX_LENGTH)
}

/// Validates a GA4 event parameter name.
///
/// # Errors
///
/// Returns [`ValidationError`] under the same rules as
/// [`validate_ga4_event_name`].
pub fn validate_ga4_parameter_name(parameter_name: &str) -> Result<String, ValidationError> {
    validate_ga4_identifier(
        parameter_name,
        "Parameter name",
        "parameter_name",
        GA4_PARAMETER_NAME_MAX_LENGTH,
    )
}

/// Applies the GA4 identifier grammar `^[A-Za-z][A-Za-z0-9_]*$`.
fn validate_ga4_identifier(
    value: &str,
    label: &str,
    field: &str,
    max_length: usize,
) -> Result<String, ValidationError> {
    let Some(first) = value.chars().next() else {
        return Err(ValidationError::new(format!("{label} cannot be empty")).with_field(field));
    };
    let length = value.chars().count();
    if length > max_length {
        return Err(ValidationError::new(format!("{label} exceeds maximum length of {max_length}"))
            .with_field(field)
            .with_value(format!("{length} characters"))
            .with_expected(format!("<= {max_length} characters")));
    }
    if !first.is_alphabetic() {
        return Err(ValidationError::new(format!("{label} must start with a letter"))
            .with_field(field)
            .with_value(value)
            .with_expected("starts with a letter"));
    }
    let grammar_ok = first.is_ascii_alphabetic()
        && value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !grammar_ok {
        return Err(ValidationError::new(format!(
            "{label} can only contain letters, numbers, and underscores"
        ))
        .with_field(field)
        .with_value(value)
        .with_expected("alphanumeric with underscores"));
    }
    Ok(value.to_string())
}

/// Validates decoded GA4 event parameter records.
///
/// Each record must be an object with `name` and `value` keys; names must
/// satisfy [`validate_ga4_parameter_name`]. Scalar values are stringified.
///
/// # Errors
///
/// Returns [`ValidationError`] for the first malformed record.
pub fn validate_event_parameters(parameters: &Value) -> Result<Vec<EventParameter>, ValidationError> {
    let Value::Array(items) = parameters else {
        return Err(ValidationError::new("Event parameters must be a list")
            .with_field("parameters")
            .with_value(json_type_name(parameters))
            .with_expected("list of dictionaries"));
    };
    let mut validated = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::Object(record) = item else {
            return Err(ValidationError::new(format!(
                "Parameter at index {index} must be a dictionary"
            ))
            .with_field("parameters")
            .with_value(json_type_name(item))
            .with_expected("dictionary"));
        };
        let Some(name) = record.get("name") else {
            return Err(ValidationError::new(format!("Parameter at index {index} missing 'name' key"))
                .with_field("parameters"));
        };
        let Some(value) = record.get("value") else {
            return Err(ValidationError::new(format!(
                "Parameter at index {index} missing 'value' key"
            ))
            .with_field("parameters"));
        };
        let name = require_str(name, "parameter_name")?;
        let name = validate_ga4_parameter_name(name)?;
        validated.push(EventParameter {
            name,
            value: template_text(value),
        });
    }
    Ok(validated)
}

// ============================================================================
// SECTION: Lists and Scalars
// ============================================================================

/// Validates decoded trigger identifiers.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value is not a list, is empty, holds a
/// non-string, or holds a blank string.
pub fn validate_trigger_ids(trigger_ids: &Value) -> Result<Vec<String>, ValidationError> {
    let Value::Array(items) = trigger_ids else {
        return Err(ValidationError::new("Trigger IDs must be a list")
            .with_field("trigger_ids")
            .with_value(json_type_name(trigger_ids))
            .with_expected("list of strings"));
    };
    if items.is_empty() {
        return Err(ValidationError::new("Trigger IDs list cannot be empty").with_field("trigger_ids"));
    }
    let mut validated = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::String(trigger_id) = item else {
            return Err(ValidationError::new(format!("Trigger ID at index {index} must be a string"))
                .with_field("trigger_ids")
                .with_value(json_type_name(item))
                .with_expected("string"));
        };
        if trigger_id.trim().is_empty() {
            return Err(ValidationError::new(format!("Trigger ID at index {index} cannot be empty"))
                .with_field("trigger_ids"));
        }
        validated.push(trigger_id.clone());
    }
    Ok(validated)
}

/// Validates a CSS selector. No grammar checking is attempted.
///
/// # Errors
///
/// Returns [`ValidationError`] when the selector is empty or has leading or
/// trailing whitespace.
pub fn validate_css_selector(selector: &str) -> Result<String, ValidationError> {
    if selector.is_empty() {
        return Err(ValidationError::new("CSS selector cannot be empty").with_field("selector"));
    }
    if selector != selector.trim() {
        return Err(ValidationError::new("CSS selector cannot start or end with whitespace")
            .with_field("selector")
            .with_value(selector)
            .with_expected("trimmed string"));
    }
    Ok(selector.to_string())
}

/// Validates a decoded integer within `min_value..=max_value`.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value is not an integer or falls
/// outside the bounds.
pub fn validate_positive_integer(
    value: &Value,
    field_name: &str,
    min_value: i64,
    max_value: Option<i64>,
) -> Result<i64, ValidationError> {
    let label = capitalize(field_name);
    let Some(number) = value.as_i64() else {
        return Err(ValidationError::new(format!("{label} must be an integer"))
            .with_field(field_name)
            .with_value(json_type_name(value))
            .with_expected("integer"));
    };
    if number < min_value {
        return Err(ValidationError::new(format!("{label} must be >= {min_value}"))
            .with_field(field_name)
            .with_value(number)
            .with_expected(format!(">= {min_value}")));
    }
    if let Some(max_value) = max_value
        && number > max_value
    {
        return Err(ValidationError::new(format!("{label} must be <= {max_value}"))
            .with_field(field_name)
            .with_value(number)
            .with_expected(format!("<= {max_value}")));
    }
    Ok(number)
}

/// Borrows a decoded value as a string or fails naming the field.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value is not a JSON string.
pub fn require_str<'a>(value: &'a Value, field_name: &str) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| {
        ValidationError::new(format!("{} must be a string", capitalize(field_name)))
            .with_field(field_name)
            .with_value(json_type_name(value))
            .with_expected("string")
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `value` is non-empty and every char is an ASCII digit.
fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

/// Uppercases the first character and lowercases the rest.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Renders a list of codes as `['A', 'B']`.
fn quoted_list(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("'{value}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// Names the JSON type of a value for error detail.
pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Renders a decoded value as GTM template text.
///
/// Strings are used as-is; other values use their JSON form.
pub(crate) fn template_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
