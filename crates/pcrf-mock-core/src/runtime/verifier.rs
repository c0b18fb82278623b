// crates/pcrf-mock-core/src/runtime/verifier.rs
// ============================================================================
// Module: Rate Verifier
// Description: Tolerant comparison of measured throughput against QoS bounds.
// Purpose: Decide whether observed data-plane throughput matches enforced policy.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Live traffic is noisy, so the verifier never checks equality. A sample
//! passes when its relative error against the upper bound stays within the
//! tolerance and, when a positive lower bound is given, it does not fall
//! below that floor. Invalid bounds fail fast with [`ConfigurationError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::ConfigurationError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One throughput sample and the bounds it is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSample {
    /// Observed bitrate.
    pub observed_bps: f64,
    /// Configured ceiling.
    pub upper_bound_bps: f64,
    /// Expected floor; zero disables the floor check.
    pub lower_bound_bps: f64,
}

/// Reason a sample failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RateFailure {
    /// Relative error exceeded the tolerance.
    OutsideTolerance {
        /// Computed relative error.
        relative_error: f64,
        /// Allowed tolerance.
        tolerance: f64,
    },
    /// Observed rate fell below the floor.
    BelowLowerBound {
        /// Floor that was violated.
        lower_bound_bps: f64,
    },
}

/// Verification result for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationOutcome {
    /// The sample checked.
    pub sample: RateSample,
    /// Allowed relative tolerance.
    pub tolerance: f64,
    /// `|observed - upper| / upper`.
    pub relative_error: f64,
    /// Failures found; empty on pass.
    pub failures: Vec<RateFailure>,
}

impl VerificationOutcome {
    /// Returns true when the sample passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.passed() { "pass" } else { "fail" };
        write!(
            f,
            "{verdict}: observed {:.0} bps, expected {:.0} bps (relative error {:.4}, tolerance {:.4}",
            self.sample.observed_bps, self.sample.upper_bound_bps, self.relative_error, self.tolerance
        )?;
        if self.sample.lower_bound_bps > 0.0 {
            write!(f, ", floor {:.0} bps", self.sample.lower_bound_bps)?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies an observed rate against an upper bound, tolerance, and optional floor.
///
/// # Errors
///
/// Returns [`ConfigurationError`] when any input is not finite, the upper
/// bound is not positive, or the observed rate, lower bound, or tolerance is
/// negative.
pub fn verify_rate(
    observed_bps: f64,
    upper_bound_bps: f64,
    lower_bound_bps: f64,
    tolerance: f64,
) -> Result<VerificationOutcome, ConfigurationError> {
    for (field, value) in [
        ("observed rate", observed_bps),
        ("upper bound", upper_bound_bps),
        ("lower bound", lower_bound_bps),
        ("relative tolerance", tolerance),
    ] {
        if !value.is_finite() {
            return Err(ConfigurationError::NonFinite {
                field,
            });
        }
    }
    if observed_bps < 0.0 {
        return Err(ConfigurationError::NegativeObservedRate(observed_bps));
    }
    if upper_bound_bps <= 0.0 {
        return Err(ConfigurationError::NonPositiveBound(upper_bound_bps));
    }
    if lower_bound_bps < 0.0 {
        return Err(ConfigurationError::NegativeLowerBound(lower_bound_bps));
    }
    if tolerance < 0.0 {
        return Err(ConfigurationError::NegativeTolerance(tolerance));
    }

    let relative_error = (observed_bps - upper_bound_bps).abs() / upper_bound_bps;
    let mut failures = Vec::new();
    if relative_error > tolerance {
        failures.push(RateFailure::OutsideTolerance {
            relative_error,
            tolerance,
        });
    }
    if lower_bound_bps > 0.0 && observed_bps < lower_bound_bps {
        failures.push(RateFailure::BelowLowerBound {
            lower_bound_bps,
        });
    }

    Ok(VerificationOutcome {
        sample: RateSample {
            observed_bps,
            upper_bound_bps,
            lower_bound_bps,
        },
        tolerance,
        relative_error,
        failures,
    })
}
