// crates/pcrf-mock-harness/tests/helpers/audit.rs
// ============================================================================
// Module: Recording Audit Sink
// Description: Audit sink that keeps events in memory.
// ============================================================================

use std::sync::Mutex;

use pcrf_mock_core::MockAuditEvent;
use pcrf_mock_core::MockAuditSink;

/// Captures audit events for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<MockAuditEvent>>,
}

impl RecordingSink {
    /// Returns captured event labels in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .map_or_else(|_| Vec::new(), |events| events.iter().map(|event| event.event).collect())
    }

    /// Returns captured events with the given label.
    pub fn events_named(&self, label: &str) -> Vec<MockAuditEvent> {
        self.events.lock().map_or_else(
            |_| Vec::new(),
            |events| events.iter().filter(|event| event.event == label).cloned().collect(),
        )
    }
}

impl MockAuditSink for RecordingSink {
    fn record(&self, event: &MockAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
