// crates/pcrf-mock-core/src/runtime/store.rs
// ============================================================================
// Module: Expectation Store
// Description: Ordered expectation registry with first-match-wins lookup.
// Purpose: Resolve inbound requests to a registered expectation or the default answer.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The store owns one registration set at a time. Registration replaces the
//! whole set, assigns contiguous indices in registration order, and clears
//! consumption state. Lookups scan in registration order and return the first
//! expectation accepting every field. When none does, the first expectation
//! matching on identity alone is used and its secondary mismatch is reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::CreditControlAnswer;
use crate::core::CreditControlRequest;
use crate::core::Expectation;
use crate::core::ExpectationIndex;
use crate::core::ExpectationSpec;
use crate::core::PartialMatchDiscrepancy;
use crate::core::RepeatPolicy;
use crate::core::RequestKind;
use crate::core::SubjectId;
use crate::core::UsageComparison;
use crate::runtime::synthesizer::AnswerSource;
use crate::runtime::synthesizer::synthesize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Matching behavior for one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Whether matched expectations stay eligible.
    #[serde(default)]
    pub repeat: RepeatPolicy,
    /// Secondary usage field comparison.
    #[serde(default)]
    pub usage: UsageComparison,
}

/// Inbound request matched no expectation and no default answer exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no expectation matched {kind} request {sequence_number} for subject {subject_id}")]
pub struct NoMatchError {
    /// Subject from the request.
    pub subject_id: SubjectId,
    /// Request kind.
    pub kind: RequestKind,
    /// Request sequence number.
    pub sequence_number: u32,
}

impl NoMatchError {
    /// Builds the error from the offending request.
    #[must_use]
    pub fn for_request(request: &CreditControlRequest) -> Self {
        Self {
            subject_id: request.subject_id.clone(),
            kind: request.kind,
            sequence_number: request.sequence_number,
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// A registered expectation accepted the request.
    Matched {
        /// The accepting expectation.
        expectation: &'a Expectation,
        /// Secondary-field mismatch, if any.
        discrepancy: Option<PartialMatchDiscrepancy>,
    },
    /// No expectation accepted the request; the default answer applies.
    Defaulted {
        /// The configured default answer.
        answer: &'a CreditControlAnswer,
    },
}

impl<'a> MatchOutcome<'a> {
    /// Returns the matched index, or `None` for the default path.
    #[must_use]
    pub const fn index(&self) -> Option<ExpectationIndex> {
        match self {
            Self::Matched {
                expectation, ..
            } => Some(expectation.index),
            Self::Defaulted {
                ..
            } => None,
        }
    }

    /// Returns the answer source for synthesis.
    #[must_use]
    pub const fn source(&self) -> AnswerSource<'a> {
        match self {
            Self::Matched {
                expectation, ..
            } => AnswerSource::Expectation(*expectation),
            Self::Defaulted {
                answer,
            } => AnswerSource::Default(*answer),
        }
    }
}

// ============================================================================
// SECTION: Expectation Store
// ============================================================================

/// Ordered expectation registry for one scenario.
#[derive(Debug, Clone, Default)]
pub struct ExpectationStore {
    /// Registered expectations in index order.
    expectations: Vec<Expectation>,
    /// Answer used when nothing matches.
    default_answer: Option<CreditControlAnswer>,
    /// Indices used up under [`RepeatPolicy::ConsumeOnce`].
    consumed: BTreeSet<ExpectationIndex>,
    /// Matching behavior.
    policy: MatchPolicy,
}

impl ExpectationStore {
    /// Creates an empty store with the given policy.
    #[must_use]
    pub const fn new(policy: MatchPolicy) -> Self {
        Self {
            expectations: Vec::new(),
            default_answer: None,
            consumed: BTreeSet::new(),
            policy,
        }
    }

    /// Replaces the registration set, assigning indices in order.
    pub fn register(
        &mut self,
        specs: Vec<ExpectationSpec>,
        default_answer: Option<CreditControlAnswer>,
    ) {
        self.expectations = specs
            .into_iter()
            .enumerate()
            .map(|(position, spec)| Expectation {
                index: ExpectationIndex::new(position),
                matcher: spec.matcher,
                answer: spec.answer,
            })
            .collect();
        self.default_answer = default_answer;
        self.consumed.clear();
    }

    /// Removes all expectations, the default answer, and consumption state.
    pub fn clear(&mut self) {
        self.expectations.clear();
        self.default_answer = None;
        self.consumed.clear();
    }

    /// Finds the first eligible expectation accepting the request.
    ///
    /// An exact match anywhere in the set wins over an earlier identity-only
    /// match.
    ///
    /// # Errors
    ///
    /// Returns [`NoMatchError`] when nothing matches and no default is set.
    pub fn find_match(
        &self,
        request: &CreditControlRequest,
    ) -> Result<MatchOutcome<'_>, NoMatchError> {
        let mut partial = None;
        for expectation in &self.expectations {
            if self.consumed.contains(&expectation.index)
                || !expectation.matcher.matches_identity(request)
            {
                continue;
            }
            match expectation.matcher.secondary_mismatch(request, self.policy.usage) {
                None => {
                    return Ok(MatchOutcome::Matched {
                        expectation,
                        discrepancy: None,
                    });
                }
                Some(discrepancy) => {
                    if partial.is_none() {
                        partial = Some((expectation, discrepancy));
                    }
                }
            }
        }
        if let Some((expectation, discrepancy)) = partial {
            return Ok(MatchOutcome::Matched {
                expectation,
                discrepancy: Some(discrepancy),
            });
        }
        self.default_answer.as_ref().map_or_else(
            || Err(NoMatchError::for_request(request)),
            |answer| {
                Ok(MatchOutcome::Defaulted {
                    answer,
                })
            },
        )
    }

    /// Resolves a request to its synthesized answer and matched index.
    ///
    /// # Errors
    ///
    /// Returns [`NoMatchError`] when nothing matches and no default is set.
    pub fn match_request(
        &self,
        request: &CreditControlRequest,
    ) -> Result<(CreditControlAnswer, Option<ExpectationIndex>), NoMatchError> {
        let outcome = self.find_match(request)?;
        Ok((synthesize(outcome.source()), outcome.index()))
    }

    /// Marks an expectation as used when the policy consumes on match.
    pub fn note_matched(&mut self, index: ExpectationIndex) {
        if self.policy.repeat == RepeatPolicy::ConsumeOnce {
            self.consumed.insert(index);
        }
    }

    /// Returns the registered expectations in index order.
    #[must_use]
    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Returns the configured default answer.
    #[must_use]
    pub const fn default_answer(&self) -> Option<&CreditControlAnswer> {
        self.default_answer.as_ref()
    }

    /// Returns the number of registered expectations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Returns true when no expectations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// Returns the matching policy.
    #[must_use]
    pub const fn policy(&self) -> MatchPolicy {
        self.policy
    }
}
