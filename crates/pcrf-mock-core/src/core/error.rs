// crates/pcrf-mock-core/src/core/error.rs
// ============================================================================
// Module: PCRF Mock Input Errors
// Description: Fail-fast errors for invalid verifier input, rules, and measurements.
// Purpose: Share error variants between the verifier, rule catalog, and harness.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Configuration errors are fatal and local to the call that raised them.
//! Measurement errors fail only the assertion that depended on the sample.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Invalid input rejected before any comparison or network interaction.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Upper bound was zero or negative.
    #[error("upper bound must be greater than zero (got {0})")]
    NonPositiveBound(f64),
    /// Observed rate was negative.
    #[error("observed rate must not be negative (got {0})")]
    NegativeObservedRate(f64),
    /// Lower bound was negative.
    #[error("lower bound must not be negative (got {0})")]
    NegativeLowerBound(f64),
    /// Relative tolerance was negative.
    #[error("relative tolerance must not be negative (got {0})")]
    NegativeTolerance(f64),
    /// A numeric input was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Name of the offending input.
        field: &'static str,
    },
    /// Policy rule failed validation.
    #[error("invalid policy rule {rule_id}: {reason}")]
    InvalidRule {
        /// Rule identifier.
        rule_id: String,
        /// Validation failure.
        reason: String,
    },
    /// Answer referenced a rule the catalog does not know.
    #[error("answer references unknown rule: {0}")]
    UnknownRule(String),
    /// No QoS ceiling is in force for the requested key and direction.
    #[error("no {direction} qos ceiling installed for monitoring key {key}")]
    MissingCeiling {
        /// Monitoring key queried.
        key: String,
        /// Direction label.
        direction: &'static str,
    },
}

/// Traffic generator returned no usable throughput sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("measurement unavailable: {0}")]
pub struct MeasurementUnavailableError(pub String);
