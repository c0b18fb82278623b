// crates/pcrf-mock-harness/src/wait.rs
// ============================================================================
// Module: Bounded Waits
// Description: Poll-with-timeout helpers for protocol settlement and traffic.
// Purpose: Replace fixed sleeps with waits bounded by configured timeouts.
// Dependencies: pcrf-mock-core, pcrf-mock-config, tokio
// ============================================================================

//! ## Overview
//! Protocol settlement and traffic measurement are awaited independently.
//! Each wait polls at the configured interval and gives up with
//! [`HarnessError::Timeout`] once its timeout elapses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use pcrf_mock_config::WaitPolicy;
use pcrf_mock_core::ExpectationResult;
use pcrf_mock_core::MeasurementReport;
use pcrf_mock_core::MockEngine;
use pcrf_mock_core::TrafficGenerator;
use pcrf_mock_core::TrafficRequest;
use tokio::task;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Protocol Settlement
// ============================================================================

/// Polls the engine until its result snapshot equals `expected`.
///
/// Returns the matching snapshot.
///
/// # Errors
///
/// Returns [`HarnessError::Timeout`] when the snapshot does not converge
/// within the expectation timeout, or [`HarnessError::Mock`] on lock failure.
pub async fn wait_for_expectations(
    engine: &MockEngine,
    expected: &BTreeSet<ExpectationResult>,
    policy: &WaitPolicy,
) -> Result<BTreeSet<ExpectationResult>, HarnessError> {
    let start = Instant::now();
    loop {
        let snapshot = engine.snapshot()?;
        if &snapshot == expected {
            return Ok(snapshot);
        }
        if start.elapsed() >= policy.expectation_timeout {
            let met = snapshot.iter().filter(|result| result.met).count();
            return Err(HarnessError::Timeout {
                operation: "expectation results",
                waited_ms: start.elapsed().as_millis(),
                detail: format!("{met} of {} expectations met", snapshot.len()),
            });
        }
        sleep(policy.poll_interval).await;
    }
}

/// Polls until the engine has processed at least `count` requests.
///
/// # Errors
///
/// Returns [`HarnessError::Timeout`] when fewer requests arrive within the
/// expectation timeout, or [`HarnessError::Mock`] on lock failure.
pub async fn wait_for_round_trips(
    engine: &MockEngine,
    count: u64,
    policy: &WaitPolicy,
) -> Result<u64, HarnessError> {
    let start = Instant::now();
    loop {
        let processed = engine.processed_requests()?;
        if processed >= count {
            return Ok(processed);
        }
        if start.elapsed() >= policy.expectation_timeout {
            return Err(HarnessError::Timeout {
                operation: "credit-control round trips",
                waited_ms: start.elapsed().as_millis(),
                detail: format!("{processed} of {count} requests processed"),
            });
        }
        sleep(policy.poll_interval).await;
    }
}

// ============================================================================
// SECTION: Traffic Measurement
// ============================================================================

/// Runs one traffic measurement on the blocking pool and parses its report.
///
/// # Errors
///
/// Returns [`HarnessError::Timeout`] when the generator exceeds the
/// measurement timeout, [`HarnessError::Collaborator`] when it fails, and
/// [`HarnessError::Measurement`] when its report is malformed.
pub async fn await_measurement(
    generator: Arc<dyn TrafficGenerator + Send + Sync>,
    request: TrafficRequest,
    policy: &WaitPolicy,
) -> Result<MeasurementReport, HarnessError> {
    let start = Instant::now();
    let subject = request.subject_id.clone();
    let run = task::spawn_blocking(move || generator.generate_traffic(&request));
    let raw = match timeout(policy.measurement_timeout, run).await {
        Ok(joined) => joined.map_err(|err| HarnessError::Runtime(err.to_string()))??,
        Err(_) => {
            return Err(HarnessError::Timeout {
                operation: "traffic measurement",
                waited_ms: start.elapsed().as_millis(),
                detail: format!("no report for subject {subject}"),
            });
        }
    };
    Ok(MeasurementReport::parse(&raw)?)
}
