// crates/gtm-core/tests/proptest_parameters.rs
// ============================================================================
// Module: Parameter Property-Based Tests
// Description: Property tests for scroll normalization and parameter merging.
// Purpose: Check normalization and merge invariants across wide input ranges.
// ============================================================================

//! Property-based tests for scroll threshold and merge invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;

use gtm_core::Parameter;
use gtm_core::parameters::merge_parameters;
use gtm_core::parameters::template_parameter;
use gtm_core::parameters::trigger_reference_parameter;
use gtm_core::validation::validate_scroll_percentage_list;
use gtm_core::validation::validate_scroll_percentages;
use proptest::prelude::*;
use serde_json::json;

fn keyed_params(max: usize) -> impl Strategy<Value = Vec<Parameter>> {
    prop::collection::vec(("[a-d]{0,2}", "[a-z0-9]{0,4}"), 0 .. max).prop_map(|pairs| {
        pairs.iter().map(|(key, value)| template_parameter(key, value)).collect()
    })
}

proptest! {
    #[test]
    fn scroll_normalization_is_sorted_and_unique(values in prop::collection::vec(0_i64 ..= 100, 1 .. 20)) {
        let normalized = validate_scroll_percentage_list(&values).unwrap();
        prop_assert!(normalized.windows(2).all(|pair| pair[0] < pair[1]));
        let expected: BTreeSet<i64> = values.iter().copied().collect();
        let actual: BTreeSet<i64> = normalized.iter().map(|pct| i64::from(*pct)).collect();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn scroll_normalization_is_idempotent(values in prop::collection::vec(0_i64 ..= 100, 1 .. 20)) {
        let once = validate_scroll_percentage_list(&values).unwrap();
        let twice = validate_scroll_percentages(&json!(once)).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn scroll_out_of_range_is_rejected(
        prefix in prop::collection::vec(0_i64 ..= 100, 0 .. 5),
        bad in prop_oneof![i64::MIN .. 0, 101_i64 .. i64::MAX],
    ) {
        let mut values = prefix.clone();
        values.push(bad);
        let err = validate_scroll_percentage_list(&values).unwrap_err();
        let expected = format!("Percentage at index {} must be between 0 and 100", prefix.len());
        prop_assert_eq!(err.message, expected);
    }

    #[test]
    fn merge_last_write_wins_per_key(first in keyed_params(8), second in keyed_params(8)) {
        let merged = merge_parameters([first.as_slice(), second.as_slice()]);
        let keys: Vec<&str> = merged.iter().filter_map(Parameter::key).collect();
        let unique: BTreeSet<&str> = keys.iter().copied().collect();
        prop_assert_eq!(keys.len(), unique.len());
        for param in &merged {
            let key = param.key().unwrap();
            let last = first.iter().chain(second.iter()).rev().find(|candidate| candidate.key() == Some(key)).unwrap();
            prop_assert_eq!(param, last);
        }
    }

    #[test]
    fn merge_preserves_every_unkeyed_entry(ids in prop::collection::vec("[0-9]{1,3}", 0 .. 6), extra in keyed_params(4)) {
        let references: Vec<Parameter> = ids.iter().map(trigger_reference_parameter).collect();
        let merged = merge_parameters([references.as_slice(), extra.as_slice()]);
        let unkeyed: Vec<&Parameter> = merged.iter().filter(|param| param.key().is_none()).collect();
        prop_assert_eq!(unkeyed.len(), references.len());
        let keyed_count = merged.iter().take_while(|param| param.key().is_some()).count();
        prop_assert_eq!(keyed_count, merged.len() - references.len());
    }
}
