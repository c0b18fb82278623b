// crates/pcrf-mock-core/src/core/expectation.rs
// ============================================================================
// Module: Expectation Model
// Description: Request matchers, registered expectations, and per-index results.
// Purpose: Describe what a scenario expects and how outcomes are reported.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Scenarios register [`ExpectationSpec`] values; the store turns them into
//! indexed [`Expectation`] records. Matchers compare identity fields
//! (subject, kind, sequence number) to select a candidate, then secondary
//! fields (usage reports, reported delta) to detect partial-match discrepancies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ExpectationIndex;
use crate::core::identifiers::MonitoringKey;
use crate::core::identifiers::SubjectId;
use crate::core::message::CreditControlAnswer;
use crate::core::message::CreditControlRequest;
use crate::core::message::RequestKind;

// ============================================================================
// SECTION: Matching Policies
// ============================================================================

/// Whether a matched expectation stays eligible for later requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatPolicy {
    /// Repeated matches are allowed and count as one met outcome.
    #[default]
    Repeatable,
    /// An expectation is used up by its first match.
    ConsumeOnce,
}

/// How secondary usage fields are compared once identity fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageComparison {
    /// Usage reports and reported delta must equal exactly.
    #[default]
    Exact,
    /// The matcher's reported delta is a tolerance band around each expected report.
    WithinDelta,
}

// ============================================================================
// SECTION: Request Matcher
// ============================================================================

/// Predicate over inbound requests.
///
/// # Invariants
/// - Identity fields are always compared.
/// - Optional fields are compared only when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMatcher {
    /// Expected subject.
    pub subject_id: SubjectId,
    /// Expected request kind.
    pub kind: RequestKind,
    /// Expected sequence number.
    pub sequence_number: u32,
    /// Expected usage reports, when constrained.
    #[serde(default)]
    pub usage_reports: Option<BTreeMap<MonitoringKey, u64>>,
    /// Expected reported delta, when constrained.
    #[serde(default)]
    pub reported_delta: Option<u64>,
}

impl RequestMatcher {
    /// Returns true when subject, kind, and sequence number match.
    #[must_use]
    pub fn matches_identity(&self, request: &CreditControlRequest) -> bool {
        self.subject_id == request.subject_id
            && self.kind == request.kind
            && self.sequence_number == request.sequence_number
    }

    /// Compares secondary fields, returning the first mismatch found.
    #[must_use]
    pub fn secondary_mismatch(
        &self,
        request: &CreditControlRequest,
        comparison: UsageComparison,
    ) -> Option<PartialMatchDiscrepancy> {
        match comparison {
            UsageComparison::Exact => self.exact_mismatch(request),
            UsageComparison::WithinDelta => self.delta_mismatch(request),
        }
    }

    /// Exact comparison of usage reports and reported delta.
    fn exact_mismatch(&self, request: &CreditControlRequest) -> Option<PartialMatchDiscrepancy> {
        if let Some(expected) = &self.usage_reports
            && expected != &request.monitoring_reports
        {
            return Some(PartialMatchDiscrepancy {
                field: "monitoring_reports".to_string(),
                expected: format_reports(expected),
                actual: format_reports(&request.monitoring_reports),
            });
        }
        if let Some(expected) = self.reported_delta
            && Some(expected) != request.reported_delta
        {
            return Some(PartialMatchDiscrepancy {
                field: "reported_delta".to_string(),
                expected: expected.to_string(),
                actual: request
                    .reported_delta
                    .map_or_else(|| "absent".to_string(), |delta| delta.to_string()),
            });
        }
        None
    }

    /// Tolerance-band comparison of usage reports.
    fn delta_mismatch(&self, request: &CreditControlRequest) -> Option<PartialMatchDiscrepancy> {
        let expected = self.usage_reports.as_ref()?;
        let delta = self.reported_delta.unwrap_or(0);
        for (key, expected_bytes) in expected {
            let field = format!("monitoring_reports.{key}");
            let Some(actual_bytes) = request.monitoring_reports.get(key) else {
                return Some(PartialMatchDiscrepancy {
                    field,
                    expected: format!("{expected_bytes} ± {delta}"),
                    actual: "absent".to_string(),
                });
            };
            if actual_bytes.abs_diff(*expected_bytes) > delta {
                return Some(PartialMatchDiscrepancy {
                    field,
                    expected: format!("{expected_bytes} ± {delta}"),
                    actual: actual_bytes.to_string(),
                });
            }
        }
        None
    }
}

impl From<&CreditControlRequest> for RequestMatcher {
    fn from(request: &CreditControlRequest) -> Self {
        Self {
            subject_id: request.subject_id.clone(),
            kind: request.kind,
            sequence_number: request.sequence_number,
            usage_reports: (!request.monitoring_reports.is_empty())
                .then(|| request.monitoring_reports.clone()),
            reported_delta: request.reported_delta,
        }
    }
}

impl From<CreditControlRequest> for RequestMatcher {
    fn from(request: CreditControlRequest) -> Self {
        Self::from(&request)
    }
}

/// Renders usage reports as `key=bytes` pairs.
fn format_reports(reports: &BTreeMap<MonitoringKey, u64>) -> String {
    let pairs: Vec<String> = reports.iter().map(|(key, bytes)| format!("{key}={bytes}")).collect();
    format!("{{{}}}", pairs.join(", "))
}

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Expectation as supplied by a scenario, before an index is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationSpec {
    /// Request predicate.
    pub matcher: RequestMatcher,
    /// Canned answer returned on match.
    pub answer: CreditControlAnswer,
}

impl ExpectationSpec {
    /// Pairs an expected request with the answer to return for it.
    #[must_use]
    pub fn new(expected: impl Into<RequestMatcher>, answer: CreditControlAnswer) -> Self {
        Self {
            matcher: expected.into(),
            answer,
        }
    }
}

/// Registered expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expectation {
    /// Stable registration index.
    pub index: ExpectationIndex,
    /// Request predicate.
    pub matcher: RequestMatcher,
    /// Canned answer.
    pub answer: CreditControlAnswer,
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Whether one registered expectation was met during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExpectationResult {
    /// Expectation index.
    pub index: ExpectationIndex,
    /// True when matched at least once.
    pub met: bool,
}

impl ExpectationResult {
    /// Creates a result for a raw index.
    #[must_use]
    pub const fn new(index: usize, met: bool) -> Self {
        Self {
            index: ExpectationIndex::new(index),
            met,
        }
    }
}

/// Secondary-field mismatch on an otherwise matched expectation.
///
/// Recorded alongside `met = true`; it is a soft warning, not a hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("partial match on {field}: expected {expected}, got {actual}")]
pub struct PartialMatchDiscrepancy {
    /// Field that differed.
    pub field: String,
    /// Expected rendering.
    pub expected: String,
    /// Observed rendering.
    pub actual: String,
}

/// Request that no expectation accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnexpectedRequest {
    /// The request as received.
    pub request: CreditControlRequest,
    /// True when the default answer was returned.
    pub answered_with_default: bool,
}

/// Results gathered for the current registration set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExpectationReport {
    /// One result per registered index, order-independent.
    pub results: BTreeSet<ExpectationResult>,
    /// Partial-match discrepancies by index.
    pub errors: BTreeMap<ExpectationIndex, Vec<PartialMatchDiscrepancy>>,
    /// Requests that matched no expectation.
    pub unexpected: Vec<UnexpectedRequest>,
}

impl ExpectationReport {
    /// Returns true when every registered expectation was met.
    #[must_use]
    pub fn all_met(&self) -> bool {
        self.results.iter().all(|result| result.met)
    }

    /// Returns the number of met expectations.
    #[must_use]
    pub fn met_count(&self) -> usize {
        self.results.iter().filter(|result| result.met).count()
    }
}
