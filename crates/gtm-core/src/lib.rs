// crates/gtm-core/src/lib.rs
// ============================================================================
// Module: GTM Core Library
// Description: Public API surface for GTM payload validation and assembly.
// Purpose: Expose registries, validators, parameter builders, and assembly.
// Dependencies: crate::{constants, errors, validation, parameters, paths, assembly}
// ============================================================================

//! ## Overview
//! GTM core turns caller-supplied primitives into Google Tag Manager API v2
//! payloads. Inputs pass through the validator library first, then through
//! deterministic parameter builders, and finally through entity-level
//! assembly. Every function is pure and synchronous: nothing here performs
//! I/O, keeps state, or logs.
//!
//! Security posture: all inputs are untrusted and are rejected early with
//! structured [`ValidationError`] or [`ParameterFormatError`] values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assembly;
pub mod constants;
pub mod errors;
pub mod parameters;
pub mod paths;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assembly::CustomEventFilterSource;
pub use assembly::EntityParameters;
pub use assembly::EventFilters;
pub use assembly::TagDraft;
pub use assembly::TagRequest;
pub use assembly::TriggerDraft;
pub use assembly::TriggerRequest;
pub use assembly::VariableDraft;
pub use assembly::VariableRequest;
pub use assembly::VersionDraft;
pub use assembly::build_ga4_config_tag;
pub use assembly::build_ga4_event_tag;
pub use assembly::build_parameters_from_config;
pub use assembly::build_scroll_depth_trigger;
pub use assembly::build_tag;
pub use assembly::build_trigger;
pub use assembly::build_variable;
pub use assembly::build_version;
pub use assembly::select_custom_event_filter_source;
pub use constants::FilterType;
pub use constants::ParameterType;
pub use constants::TagType;
pub use constants::TriggerType;
pub use constants::VariableType;
pub use errors::GtmError;
pub use errors::ParameterFormatError;
pub use errors::ValidationError;
pub use parameters::EventParameter;
pub use parameters::Filter;
pub use parameters::Parameter;
pub use parameters::ParameterContent;
pub use paths::WorkspacePath;
