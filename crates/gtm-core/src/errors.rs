// crates/gtm-core/src/errors.rs
// ============================================================================
// Module: GTM Core Errors
// Description: Value-carrying error types for validation and assembly.
// Purpose: Separate single-field input faults from structural faults.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Two error taxonomies are exposed. [`ValidationError`] reports a single
//! field that violates a domain rule. [`ParameterFormatError`] reports a
//! structural or compositional defect found while assembling parameters.
//! Both carry structured detail so the dispatch layer can render them without
//! parsing messages. [`GtmError`] joins them for functions that can raise
//! either.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// A caller-supplied value failed a single-field domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Human-readable failure message.
    pub message: String,
    /// Name of the offending field, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Offending value, when it can be echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Description of the accepted shape or range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl ValidationError {
    /// Creates a validation error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            value: None,
            expected: None,
        }
    }

    /// Attaches the offending field name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attaches the offending value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attaches the expected shape description.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

// ============================================================================
// SECTION: Parameter Format Errors
// ============================================================================

/// A structural precondition for parameter assembly was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ParameterFormatError {
    /// Human-readable failure message.
    pub message: String,
    /// Parameter key being assembled, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_key: Option<String>,
    /// Description of the structure the builder expected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_structure: Option<String>,
}

impl ParameterFormatError {
    /// Creates a structural error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            parameter_key: None,
            expected_structure: None,
        }
    }

    /// Attaches the parameter key being assembled.
    #[must_use]
    pub fn with_parameter_key(mut self, key: impl Into<String>) -> Self {
        self.parameter_key = Some(key.into());
        self
    }

    /// Attaches the expected structure description.
    #[must_use]
    pub fn with_expected_structure(mut self, expected: impl Into<String>) -> Self {
        self.expected_structure = Some(expected.into());
        self
    }
}

// ============================================================================
// SECTION: Combined Errors
// ============================================================================

/// Errors raised by assembly functions that both validate and build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GtmError {
    /// A single input field was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A structural precondition was violated.
    #[error(transparent)]
    ParameterFormat(#[from] ParameterFormatError),
}
