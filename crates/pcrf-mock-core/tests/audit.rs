// crates/pcrf-mock-core/tests/audit.rs
// ============================================================================
// Module: Audit Sink Tests
// Description: Tests for JSON-line audit output from the engine.
// Purpose: Ensure engine events reach the file sink as parseable JSON lines.
// Dependencies: pcrf-mock-core, serde_json, tempfile
// ============================================================================

//! Audit sink tests for pcrf-mock-core.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions are permitted."
)]

use std::sync::Arc;

use pcrf_mock_core::CreditControlAnswer;
use pcrf_mock_core::CreditControlRequest;
use pcrf_mock_core::ExpectationSpec;
use pcrf_mock_core::MockEngine;
use pcrf_mock_core::MockEngineConfig;
use pcrf_mock_core::RequestKind;
use pcrf_mock_core::runtime::FileAuditSink;

/// Verifies engine events are appended to the audit file in order.
#[test]
fn file_sink_receives_engine_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pcrf-mock-audit.jsonl");
    let sink = Arc::new(FileAuditSink::new(&path).unwrap());
    let engine = MockEngine::with_audit_sink(MockEngineConfig::default(), sink);

    let request = CreditControlRequest::new("001010000000001", RequestKind::Initial, 1);
    engine
        .set_expectations(
            vec![ExpectationSpec::new(request.clone(), CreditControlAnswer::success())],
            None,
        )
        .unwrap();
    engine.handle_request(&request).unwrap();
    engine.clear().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> =
        content.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    let labels: Vec<&str> = events.iter().map(|event| event["event"].as_str().unwrap()).collect();
    assert_eq!(labels, vec!["expectations_set", "request_matched", "mock_cleared"]);
    assert_eq!(events[1]["subject_id"], "001010000000001");
    assert_eq!(events[1]["expectation_index"], 0);
    assert_eq!(events[0]["detail"], "count=1 default=false");
}

/// Verifies reopening the same file appends rather than truncates.
#[test]
fn file_sink_appends_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    for _ in 0 .. 2 {
        let engine =
            MockEngine::with_audit_sink(MockEngineConfig::default(), Arc::new(FileAuditSink::new(&path).unwrap()));
        engine.reset_results().unwrap();
    }
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
}
