//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Pattern search semantics (substring, case-insensitive, existential over lists)
//! - Quantified clause counting
//! - Purity of evaluation across records

use crate::engine::{check_cont, check_req, is_session_compliant};
use crate::requirement::Requirement;
use crate::test_support::{
    InMemoryAcquisitions, acquisition, file, requirements, session, templates,
};
use proptest::prelude::*;
use serde_json::{Value, json};

// ============================================================================
// Strategies
// ============================================================================

/// Label-like text: letters, digits and the separators seen in scanner labels.
fn arb_label() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9][A-Za-z0-9 ._-]{0,23}").unwrap()
}

/// A label plus a non-empty substring of it.
fn arb_label_with_substring() -> impl Strategy<Value = (String, String)> {
    arb_label()
        .prop_flat_map(|label| {
            let len = label.len();
            (Just(label), 0..len).prop_flat_map(move |(label, start)| {
                (Just(label), Just(start), (start + 1)..=len)
            })
        })
        .prop_map(|(label, start, end)| {
            let sub = label[start..end].to_string();
            (label, sub)
        })
}

fn arb_attribute_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        arb_label().prop_map(Value::String),
        (0u32..1000).prop_map(Value::from),
        prop::collection::vec(arb_label().prop_map(Value::String), 0..4).prop_map(Value::Array),
    ]
}

fn live_files(matching: usize, noise: usize) -> Vec<Value> {
    let mut files = Vec::with_capacity(matching + noise);
    files.extend((0..matching).map(|_| json!({"type": "nifti"})));
    files.extend((0..noise).map(|_| json!({"type": "dicom"})));
    files
}

fn pattern(source: &str) -> Requirement {
    Requirement::from_json(&json!(source), "prop").unwrap()
}

// ============================================================================
// Pattern search
// ============================================================================

proptest! {
    /// Any escaped substring of a value matches it, whatever its case.
    #[test]
    fn escaped_substring_matches_case_insensitively((label, sub) in arb_label_with_substring()) {
        let record = acquisition(json!({"label": label}));
        let upper = regex::escape(&sub.to_uppercase());
        let lower = regex::escape(&sub.to_lowercase());
        prop_assert!(check_req(&record, "label", &pattern(&upper)).is_ok());
        prop_assert!(check_req(&record, "label", &pattern(&lower)).is_ok());
    }

    /// A list attribute matches when at least one element does.
    #[test]
    fn list_match_is_existential(
        items in prop::collection::vec(arb_label(), 1..6),
        needle in arb_label(),
    ) {
        let record = file(json!({"tags": items}));
        let escaped = format!("^{}$", regex::escape(&needle));
        let expected = items.iter().any(|item| item.eq_ignore_ascii_case(&needle));
        prop_assert_eq!(check_req(&record, "tags", &pattern(&escaped)).is_ok(), expected);
    }

    /// Evaluating twice gives the same answer and leaves the record as it was.
    #[test]
    fn check_req_is_deterministic(value in arb_attribute_value(), source in arb_label()) {
        let record = session(json!({"operator": value}));
        let before = record.clone();
        let req = pattern(&regex::escape(&source));
        let first = check_req(&record, "operator", &req);
        let second = check_req(&record, "operator", &req);
        prop_assert_eq!(first, second);
        prop_assert_eq!(record, before);
    }
}

// ============================================================================
// Quantified clauses
// ============================================================================

proptest! {
    /// A files clause passes exactly when enough live files match, wherever they sit.
    #[test]
    fn files_clause_counts_matches(
        files in (0usize..6, 0usize..6)
            .prop_flat_map(|(m, n)| Just(live_files(m, n)).prop_shuffle().prop_map(move |f| (m, f))),
        minimum in 0usize..7,
    ) {
        let (matching, files) = files;
        let record = acquisition(json!({"files": files}));
        let reqs = requirements(json!({"files": [{"type": "^nifti$", "minimum": minimum}]}));
        prop_assert_eq!(check_cont(&record, &reqs).is_ok(), matching >= minimum);
    }

    /// Deleted files never count toward a minimum.
    #[test]
    fn deleted_files_never_count(deleted in 1usize..6, minimum in 1usize..4) {
        let files: Vec<Value> = (0..deleted)
            .map(|_| json!({"type": "nifti", "deleted": "2020-01-01T00:00:00Z"}))
            .collect();
        let record = acquisition(json!({"files": files}));
        let reqs = requirements(json!({"files": [{"type": "nifti", "minimum": minimum}]}));
        let err = check_cont(&record, &reqs).unwrap_err();
        prop_assert!(err.message.ends_with("(0 found)"));
    }
}

// ============================================================================
// Purity across sessions
// ============================================================================

proptest! {
    /// A verdict does not depend on which sessions were checked before it.
    #[test]
    fn verdicts_do_not_leak_between_sessions(
        first_label in arb_label(),
        second_label in arb_label(),
        first_acqs in prop::collection::vec(arb_label(), 0..4),
        second_acqs in prop::collection::vec(arb_label(), 0..4),
    ) {
        let set = templates(vec![
            json!({"session": {"label": "[a-m]"}, "acquisitions": [{"label": "[0-9]", "minimum": 1}]}),
            json!({"acquisitions": [{"label": "_", "minimum": 2}]}),
        ]);
        let source = InMemoryAcquisitions::default()
            .with("a", first_acqs.iter().map(|l| acquisition(json!({"label": l}))).collect())
            .with("b", second_acqs.iter().map(|l| acquisition(json!({"label": l}))).collect());
        let first = session(json!({"_id": "a", "label": first_label}));
        let second = session(json!({"_id": "b", "label": second_label}));

        let alone = is_session_compliant(&second, &set, &source).unwrap();
        let _ = is_session_compliant(&first, &set, &source).unwrap();
        let after = is_session_compliant(&second, &set, &source).unwrap();
        prop_assert_eq!(alone, after);
    }
}
