// crates/pcrf-mock-harness/src/enforcement.rs
// ============================================================================
// Module: Enforcement Checks
// Description: Rate verification of measured traffic against QoS ceilings.
// Purpose: Confirm the data plane enforces the QoS the mock's answers installed.
// Dependencies: pcrf-mock-core
// ============================================================================

//! ## Overview
//! Rate verification of measured traffic against QoS ceilings.

use pcrf_mock_core::MeasurementReport;
use pcrf_mock_core::MockAuditEvent;
use pcrf_mock_core::MockAuditSink;
use pcrf_mock_core::VerificationOutcome;
use pcrf_mock_core::verify_rate;

use crate::error::HarnessError;

/// Bounds a measured rate is checked against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    /// QoS ceiling in force.
    pub upper_bps: u64,
    /// Expected floor; zero disables the floor check.
    pub lower_bps: f64,
    /// Allowed relative deviation from the ceiling.
    pub tolerance: f64,
}

/// Verifies a parsed measurement and emits `rate_verified` or `rate_failed`.
///
/// A failing outcome is returned as `Ok`; only invalid bounds are errors.
///
/// # Errors
///
/// Returns [`HarnessError::Configuration`] when the bounds are invalid.
#[allow(
    clippy::cast_precision_loss,
    reason = "Bitrate ceilings are far below 2^52 bps."
)]
pub fn verify_measured_rate(
    report: &MeasurementReport,
    bounds: RateBounds,
    audit: &dyn MockAuditSink,
) -> Result<VerificationOutcome, HarnessError> {
    let outcome =
        verify_rate(report.received_bps(), bounds.upper_bps as f64, bounds.lower_bps, bounds.tolerance)?;
    let label = if outcome.passed() { "rate_verified" } else { "rate_failed" };
    audit.record(&MockAuditEvent::new(label).with_detail(outcome.to_string()));
    Ok(outcome)
}
