// crates/pcrf-mock-core/src/runtime/synthesizer.rs
// ============================================================================
// Module: Response Synthesizer
// Description: Pure conversion from a matched expectation or default into an answer.
// Purpose: Produce structurally valid credit-control answers without touching shared state.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Synthesis never fails and never mutates engine state. Rule sets are
//! carried as explicit (possibly empty) sets so "no rules" is distinguishable
//! from an omitted field on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AnswerMessage;
use crate::core::CreditControlAnswer;
use crate::core::CreditControlRequest;
use crate::core::Expectation;

// ============================================================================
// SECTION: Synthesis
// ============================================================================

/// Where an answer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource<'a> {
    /// A matched expectation's canned answer.
    Expectation(&'a Expectation),
    /// The registration set's default answer.
    Default(&'a CreditControlAnswer),
}

/// Builds the answer for a matched expectation or the default.
#[must_use]
pub fn synthesize(source: AnswerSource<'_>) -> CreditControlAnswer {
    let canned = match source {
        AnswerSource::Expectation(expectation) => &expectation.answer,
        AnswerSource::Default(answer) => answer,
    };
    CreditControlAnswer {
        result_code: canned.result_code,
        rule_installs: canned.rule_installs.clone(),
        rule_removals: canned.rule_removals.clone(),
        monitor_directives: canned.monitor_directives.clone(),
    }
}

/// Builds the wire answer for a request.
#[must_use]
pub fn synthesize_message(
    request: &CreditControlRequest,
    source: AnswerSource<'_>,
) -> AnswerMessage {
    AnswerMessage::for_request(request, synthesize(source))
}
