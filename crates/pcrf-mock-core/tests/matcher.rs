// crates/pcrf-mock-core/tests/matcher.rs
// ============================================================================
// Module: Expectation Store Tests
// Description: Tests for registration, first-match lookup, and default fallback.
// Purpose: Validate deterministic matching of requests against expectations.
// Dependencies: pcrf-mock-core
// ============================================================================
//! ## Overview
//! Exercises index assignment, first-match-wins ordering, default and no-match
//! paths, secondary-field discrepancies, and the consume-once policy.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use pcrf_mock_core::CreditControlAnswer;
use pcrf_mock_core::CreditControlRequest;
use pcrf_mock_core::ExpectationIndex;
use pcrf_mock_core::ExpectationSpec;
use pcrf_mock_core::RepeatPolicy;
use pcrf_mock_core::RequestKind;
use pcrf_mock_core::ResultCode;
use pcrf_mock_core::UsageComparison;
use pcrf_mock_core::UsageQuota;
use pcrf_mock_core::runtime::ExpectationStore;
use pcrf_mock_core::runtime::MatchOutcome;
use pcrf_mock_core::runtime::MatchPolicy;

fn init_request(subject: &str) -> CreditControlRequest {
    CreditControlRequest::new(subject, RequestKind::Initial, 1)
}

fn store_with(policy: MatchPolicy, specs: Vec<ExpectationSpec>) -> ExpectationStore {
    let mut store = ExpectationStore::new(policy);
    store.register(specs, Some(CreditControlAnswer::success()));
    store
}

/// Verifies indices are contiguous from zero in registration order.
#[test]
fn register_assigns_contiguous_indices() {
    let store = store_with(
        MatchPolicy::default(),
        vec![
            ExpectationSpec::new(init_request("a"), CreditControlAnswer::success()),
            ExpectationSpec::new(init_request("b"), CreditControlAnswer::success()),
            ExpectationSpec::new(init_request("c"), CreditControlAnswer::success()),
        ],
    );
    let indices: Vec<usize> = store.expectations().iter().map(|exp| exp.index.get()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

/// Verifies registration replaces the previous set entirely.
#[test]
fn register_replaces_prior_set() {
    let mut store = store_with(
        MatchPolicy::default(),
        vec![ExpectationSpec::new(init_request("old"), CreditControlAnswer::success())],
    );
    store.register(
        vec![ExpectationSpec::new(init_request("new"), CreditControlAnswer::success())],
        None,
    );
    assert_eq!(store.len(), 1);
    assert!(store.default_answer().is_none());
    assert!(store.find_match(&init_request("old")).is_err());
    assert_eq!(
        store.find_match(&init_request("new")).unwrap().index(),
        Some(ExpectationIndex::new(0))
    );
}

/// Verifies the first expectation in registration order wins.
#[test]
fn first_match_wins() {
    let first = CreditControlAnswer::success().with_static_rules(["first"], Vec::<String>::new());
    let second = CreditControlAnswer::success().with_static_rules(["second"], Vec::<String>::new());
    let store = store_with(
        MatchPolicy::default(),
        vec![
            ExpectationSpec::new(init_request("x"), first.clone()),
            ExpectationSpec::new(init_request("x"), second),
        ],
    );
    let (answer, index) = store.match_request(&init_request("x")).unwrap();
    assert_eq!(index, Some(ExpectationIndex::new(0)));
    assert_eq!(answer, first);
}

/// Verifies unmatched requests receive the default answer with no index.
#[test]
fn unmatched_request_uses_default() {
    let default = CreditControlAnswer::new(ResultCode::UNABLE_TO_COMPLY);
    let mut store = ExpectationStore::new(MatchPolicy::default());
    store.register(
        vec![ExpectationSpec::new(init_request("x"), CreditControlAnswer::success())],
        Some(default.clone()),
    );
    let (answer, index) =
        store.match_request(&CreditControlRequest::new("x", RequestKind::Update, 2)).unwrap();
    assert_eq!(index, None);
    assert_eq!(answer, default);
}

/// Verifies a miss without a default answer is a no-match error.
#[test]
fn unmatched_request_without_default_fails() {
    let mut store = ExpectationStore::new(MatchPolicy::default());
    store.register(vec![ExpectationSpec::new(init_request("x"), CreditControlAnswer::success())], None);
    let err = store.find_match(&init_request("y")).unwrap_err();
    assert_eq!(err.subject_id.as_str(), "y");
    assert_eq!(err.kind, RequestKind::Initial);
    assert_eq!(err.sequence_number, 1);
}

/// Verifies sequence number is part of the identity.
#[test]
fn sequence_number_mismatch_does_not_match() {
    let store = store_with(
        MatchPolicy::default(),
        vec![ExpectationSpec::new(init_request("x"), CreditControlAnswer::success())],
    );
    let outcome =
        store.find_match(&CreditControlRequest::new("x", RequestKind::Initial, 2)).unwrap();
    assert!(matches!(outcome, MatchOutcome::Defaulted { .. }));
}

/// Verifies differing usage reports yield a discrepancy on a matched index.
#[test]
fn exact_usage_mismatch_reports_discrepancy() {
    let expected = CreditControlRequest::new("x", RequestKind::Update, 2)
        .with_usage_report("mkey", 1_000_000)
        .with_reported_delta(209_715);
    let store = store_with(
        MatchPolicy::default(),
        vec![ExpectationSpec::new(expected, CreditControlAnswer::success())],
    );
    let actual = CreditControlRequest::new("x", RequestKind::Update, 2)
        .with_usage_report("mkey", 900_000)
        .with_reported_delta(209_715);
    match store.find_match(&actual).unwrap() {
        MatchOutcome::Matched {
            expectation,
            discrepancy,
        } => {
            assert_eq!(expectation.index.get(), 0);
            let discrepancy = discrepancy.expect("discrepancy");
            assert_eq!(discrepancy.field, "monitoring_reports");
        }
        MatchOutcome::Defaulted {
            ..
        } => panic!("expected identity match"),
    }
}

/// Verifies a later exact match wins over an earlier identity-only match.
#[test]
fn exact_match_wins_over_earlier_partial_match() {
    let low = CreditControlAnswer::success().with_static_rules(["RA"], Vec::<String>::new());
    let high = CreditControlAnswer::success().with_static_rules(["RB"], Vec::<String>::new());
    let store = store_with(
        MatchPolicy::default(),
        vec![
            ExpectationSpec::new(
                CreditControlRequest::new("X", RequestKind::Update, 2).with_usage_report("mk", 100),
                low,
            ),
            ExpectationSpec::new(
                CreditControlRequest::new("X", RequestKind::Update, 2).with_usage_report("mk", 900),
                high.clone(),
            ),
        ],
    );
    let request = CreditControlRequest::new("X", RequestKind::Update, 2).with_usage_report("mk", 900);
    match store.find_match(&request).unwrap() {
        MatchOutcome::Matched {
            expectation,
            discrepancy,
        } => {
            assert_eq!(expectation.index.get(), 1);
            assert!(discrepancy.is_none());
        }
        MatchOutcome::Defaulted {
            ..
        } => panic!("expected exact match"),
    }
    let (answer, index) = store.match_request(&request).unwrap();
    assert_eq!(index, Some(ExpectationIndex::new(1)));
    assert_eq!(answer, high);
}

/// Verifies the earliest identity match is used when no expectation is exact.
#[test]
fn earliest_partial_match_is_used_without_exact_match() {
    let store = store_with(
        MatchPolicy::default(),
        vec![
            ExpectationSpec::new(
                CreditControlRequest::new("X", RequestKind::Update, 2).with_usage_report("mk", 100),
                CreditControlAnswer::success(),
            ),
            ExpectationSpec::new(
                CreditControlRequest::new("X", RequestKind::Update, 2).with_usage_report("mk", 900),
                CreditControlAnswer::success(),
            ),
        ],
    );
    let request = CreditControlRequest::new("X", RequestKind::Update, 2).with_usage_report("mk", 500);
    match store.find_match(&request).unwrap() {
        MatchOutcome::Matched {
            expectation,
            discrepancy,
        } => {
            assert_eq!(expectation.index.get(), 0);
            assert_eq!(discrepancy.expect("discrepancy").field, "monitoring_reports");
        }
        MatchOutcome::Defaulted {
            ..
        } => panic!("expected identity match"),
    }
}

/// Verifies an exact usage match carries no discrepancy.
#[test]
fn exact_usage_match_is_clean() {
    let expected = CreditControlRequest::new("x", RequestKind::Update, 2)
        .with_usage_report("mkey", 1_000_000)
        .with_reported_delta(209_715);
    let store = store_with(
        MatchPolicy::default(),
        vec![ExpectationSpec::new(expected.clone(), CreditControlAnswer::success())],
    );
    match store.find_match(&expected).unwrap() {
        MatchOutcome::Matched {
            discrepancy, ..
        } => assert!(discrepancy.is_none()),
        MatchOutcome::Defaulted {
            ..
        } => panic!("expected identity match"),
    }
}

/// Verifies within-delta comparison tolerates usage inside the band.
#[test]
fn within_delta_usage_tolerates_band() {
    let policy = MatchPolicy {
        repeat: RepeatPolicy::Repeatable,
        usage: UsageComparison::WithinDelta,
    };
    let expected = CreditControlRequest::new("x", RequestKind::Update, 2)
        .with_usage_report("mkey", 1_048_576)
        .with_reported_delta(209_715);
    let store =
        store_with(policy, vec![ExpectationSpec::new(expected, CreditControlAnswer::success())]);

    let inside =
        CreditControlRequest::new("x", RequestKind::Update, 2).with_usage_report("mkey", 900_000);
    let outside =
        CreditControlRequest::new("x", RequestKind::Update, 2).with_usage_report("mkey", 500_000);
    let missing = CreditControlRequest::new("x", RequestKind::Update, 2);

    for (request, expect_clean) in [(inside, true), (outside, false), (missing, false)] {
        match store.find_match(&request).unwrap() {
            MatchOutcome::Matched {
                discrepancy, ..
            } => assert_eq!(discrepancy.is_none(), expect_clean),
            MatchOutcome::Defaulted {
                ..
            } => panic!("expected identity match"),
        }
    }
}

/// Verifies consume-once skips a used expectation on later requests.
#[test]
fn consume_once_skips_used_expectation() {
    let policy = MatchPolicy {
        repeat: RepeatPolicy::ConsumeOnce,
        usage: UsageComparison::Exact,
    };
    let mut store = store_with(
        policy,
        vec![
            ExpectationSpec::new(init_request("x"), CreditControlAnswer::success()),
            ExpectationSpec::new(
                init_request("x"),
                CreditControlAnswer::new(ResultCode::AUTHORIZATION_REJECTED),
            ),
        ],
    );
    let first = store.find_match(&init_request("x")).unwrap().index().unwrap();
    store.note_matched(first);
    let (answer, second) = store.match_request(&init_request("x")).unwrap();
    assert_eq!(second, Some(ExpectationIndex::new(1)));
    assert_eq!(answer.result_code, ResultCode::AUTHORIZATION_REJECTED);

    store.note_matched(ExpectationIndex::new(1));
    assert_eq!(store.find_match(&init_request("x")).unwrap().index(), None);
}

/// Verifies repeatable policy keeps matching the same expectation.
#[test]
fn repeatable_keeps_expectation_eligible() {
    let mut store = store_with(
        MatchPolicy::default(),
        vec![ExpectationSpec::new(init_request("x"), CreditControlAnswer::success())],
    );
    store.note_matched(ExpectationIndex::new(0));
    assert_eq!(
        store.find_match(&init_request("x")).unwrap().index(),
        Some(ExpectationIndex::new(0))
    );
}

/// Verifies clear drops expectations and the default answer.
#[test]
fn clear_discards_registration() {
    let mut store = store_with(
        MatchPolicy::default(),
        vec![ExpectationSpec::new(
            init_request("x"),
            CreditControlAnswer::success().with_usage_monitor("mkey", UsageQuota::rule_level(1)),
        )],
    );
    store.clear();
    assert!(store.is_empty());
    assert!(store.find_match(&init_request("x")).is_err());
}
