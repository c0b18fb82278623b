// crates/pcrf-mock-core/src/core/measurement.rs
// ============================================================================
// Module: Measurement Reports
// Description: Typed schema for traffic-generator throughput reports.
// Purpose: Replace untyped JSON access with validated deserialization.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Traffic generators report a JSON document whose `end.sum_received`
//! section carries the measured receive rate. Parsing is strict about the
//! fields the verifier depends on and lenient about everything else.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::MeasurementUnavailableError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted report size in bytes.
pub const MAX_MEASUREMENT_REPORT_BYTES: usize = 4 * 1024 * 1024;

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Throughput summary for one direction of a test stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Measured bitrate.
    pub bits_per_second: f64,
    /// Bytes transferred, when reported.
    #[serde(default)]
    pub bytes: Option<u64>,
    /// Measurement window in seconds, when reported.
    #[serde(default)]
    pub seconds: Option<f64>,
}

/// Final summary section of a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementEnd {
    /// Receiver-side summary.
    pub sum_received: StreamSummary,
    /// Sender-side summary, when reported.
    #[serde(default)]
    pub sum_sent: Option<StreamSummary>,
}

/// Traffic-generator measurement report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReport {
    /// Final summary.
    pub end: MeasurementEnd,
}

impl MeasurementReport {
    /// Parses a raw JSON report.
    ///
    /// # Errors
    ///
    /// Returns [`MeasurementUnavailableError`] when the report is empty, too
    /// large, malformed, missing `end.sum_received.bits_per_second`, or the
    /// received rate is negative or not finite.
    pub fn parse(raw: &str) -> Result<Self, MeasurementUnavailableError> {
        if raw.trim().is_empty() {
            return Err(MeasurementUnavailableError("empty measurement report".to_string()));
        }
        if raw.len() > MAX_MEASUREMENT_REPORT_BYTES {
            return Err(MeasurementUnavailableError(format!(
                "measurement report exceeds size limit: {} bytes (max {MAX_MEASUREMENT_REPORT_BYTES})",
                raw.len()
            )));
        }
        let report: Self =
            serde_json::from_str(raw).map_err(|err| MeasurementUnavailableError(err.to_string()))?;
        let bps = report.end.sum_received.bits_per_second;
        if !bps.is_finite() || bps < 0.0 {
            return Err(MeasurementUnavailableError(format!(
                "received bits_per_second must be a non-negative finite number (got {bps})"
            )));
        }
        Ok(report)
    }

    /// Returns the receiver-side bitrate.
    #[must_use]
    pub const fn received_bps(&self) -> f64 {
        self.end.sum_received.bits_per_second
    }
}
