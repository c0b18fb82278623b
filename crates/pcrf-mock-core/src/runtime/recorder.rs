// crates/pcrf-mock-core/src/runtime/recorder.rs
// ============================================================================
// Module: Result Recorder
// Description: Per-expectation met flags, discrepancies, and unexpected requests.
// Purpose: Reconcile what arrived against what a scenario registered.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Observations are idempotent per index: a second match of the same index
//! leaves the snapshot unchanged. Snapshots are sets so assertions compare
//! by membership, never by arrival order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::CreditControlRequest;
use crate::core::ExpectationIndex;
use crate::core::ExpectationReport;
use crate::core::ExpectationResult;
use crate::core::PartialMatchDiscrepancy;
use crate::core::UnexpectedRequest;

// ============================================================================
// SECTION: Result Recorder
// ============================================================================

/// Outcome accumulator for one registration set.
#[derive(Debug, Clone, Default)]
pub struct ResultRecorder {
    /// Number of registered expectations being tracked.
    registered: usize,
    /// Indices matched at least once.
    met: BTreeSet<ExpectationIndex>,
    /// Partial-match discrepancies by index.
    errors: BTreeMap<ExpectationIndex, Vec<PartialMatchDiscrepancy>>,
    /// Requests no expectation accepted.
    unexpected: Vec<UnexpectedRequest>,
}

impl ResultRecorder {
    /// Creates a recorder tracking no expectations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a new registration set of `registered` expectations.
    pub fn track(&mut self, registered: usize) {
        self.reset();
        self.registered = registered;
    }

    /// Records one processed request. Returns true when the index became met.
    pub fn observe(&mut self, matched: Option<ExpectationIndex>) -> bool {
        match matched {
            Some(index) if index.get() < self.registered => self.met.insert(index),
            _ => false,
        }
    }

    /// Records a secondary-field mismatch against a matched index.
    pub fn record_discrepancy(
        &mut self,
        index: ExpectationIndex,
        discrepancy: PartialMatchDiscrepancy,
    ) {
        self.errors.entry(index).or_default().push(discrepancy);
    }

    /// Records a request that matched no expectation.
    pub fn record_unexpected(&mut self, request: &CreditControlRequest, answered_with_default: bool) {
        self.unexpected.push(UnexpectedRequest {
            request: request.clone(),
            answered_with_default,
        });
    }

    /// Returns one result per tracked index.
    #[must_use]
    pub fn snapshot(&self) -> BTreeSet<ExpectationResult> {
        (0 .. self.registered)
            .map(|position| {
                let index = ExpectationIndex::new(position);
                ExpectationResult {
                    index,
                    met: self.met.contains(&index),
                }
            })
            .collect()
    }

    /// Returns partial-match discrepancies by index.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<ExpectationIndex, Vec<PartialMatchDiscrepancy>> {
        &self.errors
    }

    /// Returns the full report for the tracked set.
    #[must_use]
    pub fn report(&self) -> ExpectationReport {
        ExpectationReport {
            results: self.snapshot(),
            errors: self.errors.clone(),
            unexpected: self.unexpected.clone(),
        }
    }

    /// Clears all observations while keeping the tracked set size.
    pub fn reset(&mut self) {
        self.met.clear();
        self.errors.clear();
        self.unexpected.clear();
    }

    /// Returns the number of tracked expectations.
    #[must_use]
    pub const fn registered(&self) -> usize {
        self.registered
    }
}
