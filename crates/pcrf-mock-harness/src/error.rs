// crates/pcrf-mock-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error type for scenario harness operations.
// Purpose: Carry engine, configuration, collaborator, and timeout failures.
// Dependencies: pcrf-mock-core, pcrf-mock-config, thiserror
// ============================================================================

//! ## Overview
//! Error type for scenario harness operations.

use pcrf_mock_config::ConfigError;
use pcrf_mock_core::CollaboratorError;
use pcrf_mock_core::ConfigurationError;
use pcrf_mock_core::MeasurementUnavailableError;
use pcrf_mock_core::MockError;
use thiserror::Error;

/// Scenario harness errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Engine rejected or failed a request.
    #[error(transparent)]
    Mock(#[from] MockError),
    /// Invalid rule or verifier input.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Invalid harness configuration file.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Traffic report could not be used.
    #[error(transparent)]
    Measurement(#[from] MeasurementUnavailableError),
    /// External collaborator failed.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    /// A bounded wait expired.
    #[error("timed out after {waited_ms} ms waiting for {operation}: {detail}")]
    Timeout {
        /// What was awaited.
        operation: &'static str,
        /// Elapsed time in milliseconds.
        waited_ms: u128,
        /// Last observed state.
        detail: String,
    },
    /// The responder task is no longer accepting requests.
    #[error("responder task closed")]
    ResponderClosed,
    /// Tokio runtime missing or a blocking task failed.
    #[error("runtime error: {0}")]
    Runtime(String),
    /// Shared policy mutex was poisoned.
    #[error("policy ledger mutex poisoned")]
    LockPoisoned,
}
