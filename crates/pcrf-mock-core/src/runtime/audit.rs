// crates/pcrf-mock-core/src/runtime/audit.rs
// ============================================================================
// Module: PCRF Mock Audit Logging
// Description: Structured audit events for mock registration, matching, and verification.
// Purpose: Emit JSON-line logs without hard dependencies on a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every state-changing engine call and every processed request produces one
//! [`MockAuditEvent`]. Sinks serialize events as JSON lines; deployments route
//! them to stderr, an append-only file, or nowhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::CreditControlRequest;
use crate::core::ExpectationIndex;
use crate::core::RequestKind;
use crate::core::SubjectId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MockAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Subject when the event concerns a request.
    pub subject_id: Option<SubjectId>,
    /// Request kind when the event concerns a request.
    pub request_kind: Option<RequestKind>,
    /// Request sequence number when the event concerns a request.
    pub sequence_number: Option<u32>,
    /// Matched expectation index.
    pub expectation_index: Option<ExpectationIndex>,
    /// Free-form detail.
    pub detail: Option<String>,
}

impl MockAuditEvent {
    /// Creates an event with a consistent timestamp.
    #[must_use]
    pub fn new(event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            subject_id: None,
            request_kind: None,
            sequence_number: None,
            expectation_index: None,
            detail: None,
        }
    }

    /// Attaches the identity of a request.
    #[must_use]
    pub fn with_request(mut self, request: &CreditControlRequest) -> Self {
        self.subject_id = Some(request.subject_id.clone());
        self.request_kind = Some(request.kind);
        self.sequence_number = Some(request.sequence_number);
        self
    }

    /// Attaches an expectation index.
    #[must_use]
    pub const fn with_index(mut self, index: ExpectationIndex) -> Self {
        self.expectation_index = Some(index);
        self
    }

    /// Attaches detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for mock events.
pub trait MockAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &MockAuditEvent);
}

/// Audit sink that drops every event.
pub struct NoopAuditSink;

impl MockAuditSink for NoopAuditSink {
    fn record(&self, _event: &MockAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl MockAuditSink for StderrAuditSink {
    fn record(&self, event: &MockAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl MockAuditSink for FileAuditSink {
    fn record(&self, event: &MockAuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}
