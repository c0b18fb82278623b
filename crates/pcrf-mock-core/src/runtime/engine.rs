// crates/pcrf-mock-core/src/runtime/engine.rs
// ============================================================================
// Module: PCRF Mock Engine
// Description: Lock-guarded expectation store, result recorder, and lifecycle.
// Purpose: Answer inbound credit-control requests and report expectation outcomes.
// Dependencies: crate::{core, runtime}, serde, thiserror
// ============================================================================

//! ## Overview
//! The engine is the single path for every mock operation. One mutex guards
//! the expectation store, the result recorder, and the lifecycle state, so a
//! request never observes a half-replaced registration set and match plus
//! observe happen atomically per request.
//!
//! Lifecycle: `Uninitialized -> ExpectationsSet -> ExchangeInProgress ->
//! Terminated`. Registration re-enters `ExpectationsSet` from any state;
//! [`MockEngine::clear`] returns to `Uninitialized`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::AnswerMessage;
use crate::core::CreditControlAnswer;
use crate::core::CreditControlRequest;
use crate::core::ExpectationReport;
use crate::core::ExpectationResult;
use crate::core::ExpectationSpec;
use crate::core::RequestKind;
use crate::core::SubjectId;
use crate::runtime::audit::MockAuditEvent;
use crate::runtime::audit::MockAuditSink;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::recorder::ResultRecorder;
use crate::runtime::store::ExpectationStore;
use crate::runtime::store::MatchOutcome;
use crate::runtime::store::MatchPolicy;
use crate::runtime::store::NoMatchError;
use crate::runtime::synthesizer::synthesize_message;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MockEngineConfig {
    /// Matching behavior for registered expectations.
    pub match_policy: MatchPolicy,
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Protocol lifecycle of the current scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Nothing registered yet.
    Uninitialized,
    /// Expectations registered, no request processed since.
    ExpectationsSet,
    /// At least one request processed.
    ExchangeInProgress,
    /// A termination request was answered.
    Terminated,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Mock engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MockError {
    /// No expectation or default answer accepted the request.
    #[error(transparent)]
    NoMatch(#[from] NoMatchError),
    /// A request arrived before any expectations were registered.
    #[error("request from {0} arrived before expectations were set")]
    ExpectationsNotSet(SubjectId),
    /// A request arrived after termination without re-registration.
    #[error("request from {0} arrived after the session terminated")]
    SessionTerminated(SubjectId),
    /// Engine mutex was poisoned by a panicking holder.
    #[error("mock engine mutex poisoned")]
    LockPoisoned,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// State guarded by the engine lock.
#[derive(Debug)]
struct EngineState {
    /// Registered expectations.
    store: ExpectationStore,
    /// Outcomes for the registered set.
    recorder: ResultRecorder,
    /// Scenario lifecycle.
    lifecycle: LifecycleState,
    /// Requests processed since the last registration.
    processed: u64,
}

/// Expectation-based credit-control mock.
pub struct MockEngine {
    /// Store, recorder, and lifecycle under one lock.
    state: Mutex<EngineState>,
    /// Audit sink for engine events.
    audit: Arc<dyn MockAuditSink>,
}

impl MockEngine {
    /// Creates an engine that discards audit events.
    #[must_use]
    pub fn new(config: MockEngineConfig) -> Self {
        Self::with_audit_sink(config, Arc::new(NoopAuditSink))
    }

    /// Creates an engine with an explicit audit sink.
    #[must_use]
    pub fn with_audit_sink(config: MockEngineConfig, audit: Arc<dyn MockAuditSink>) -> Self {
        Self {
            state: Mutex::new(EngineState {
                store: ExpectationStore::new(config.match_policy),
                recorder: ResultRecorder::new(),
                lifecycle: LifecycleState::Uninitialized,
                processed: 0,
            }),
            audit,
        }
    }

    /// Acquires the engine lock.
    fn lock(&self) -> Result<MutexGuard<'_, EngineState>, MockError> {
        self.state.lock().map_err(|_| MockError::LockPoisoned)
    }

    /// Atomically replaces the registration set and resets results.
    ///
    /// Returns the number of registered expectations.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn set_expectations(
        &self,
        specs: Vec<ExpectationSpec>,
        default_answer: Option<CreditControlAnswer>,
    ) -> Result<usize, MockError> {
        let has_default = default_answer.is_some();
        let count = {
            let mut state = self.lock()?;
            state.store.register(specs, default_answer);
            let count = state.store.len();
            state.recorder.track(count);
            state.lifecycle = LifecycleState::ExpectationsSet;
            state.processed = 0;
            count
        };
        self.audit.record(
            &MockAuditEvent::new("expectations_set")
                .with_detail(format!("count={count} default={has_default}")),
        );
        Ok(count)
    }

    /// Answers one inbound request and records its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::ExpectationsNotSet`] or [`MockError::SessionTerminated`]
    /// when the lifecycle does not accept requests, and [`MockError::NoMatch`]
    /// when nothing matched and no default answer is configured.
    pub fn handle_request(&self, request: &CreditControlRequest) -> Result<AnswerMessage, MockError> {
        self.handle_request_with(request, |_| Ok(()))
    }

    /// Answers one inbound request, letting `accept` veto the synthesized
    /// answer before anything is recorded.
    ///
    /// `accept` runs under the engine lock. When it fails, the request is
    /// neither observed nor counted against an expectation and the lifecycle
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the [`MockError`] conditions of [`MockEngine::handle_request`]
    /// converted into `E`, or the error returned by `accept`.
    pub fn handle_request_with<E, F>(
        &self,
        request: &CreditControlRequest,
        accept: F,
    ) -> Result<AnswerMessage, E>
    where
        E: From<MockError> + fmt::Display,
        F: FnOnce(&AnswerMessage) -> Result<(), E>,
    {
        let (result, event) = {
            let mut guard = self.lock()?;
            let rejection = match guard.lifecycle {
                LifecycleState::Uninitialized => Some((
                    "expectations not set",
                    MockError::ExpectationsNotSet(request.subject_id.clone()),
                )),
                LifecycleState::Terminated => Some((
                    "session terminated",
                    MockError::SessionTerminated(request.subject_id.clone()),
                )),
                LifecycleState::ExpectationsSet | LifecycleState::ExchangeInProgress => None,
            };
            if let Some((detail, err)) = rejection {
                drop(guard);
                self.audit.record(
                    &MockAuditEvent::new("request_rejected").with_request(request).with_detail(detail),
                );
                return Err(err.into());
            }
            let state = &mut *guard;
            state.processed = state.processed.saturating_add(1);

            let resolved = match state.store.find_match(request) {
                Ok(outcome) => {
                    let message = synthesize_message(request, outcome.source());
                    let index = outcome.index();
                    let discrepancy = match outcome {
                        MatchOutcome::Matched {
                            discrepancy, ..
                        } => discrepancy,
                        MatchOutcome::Defaulted {
                            ..
                        } => None,
                    };
                    Ok((message, index, discrepancy))
                }
                Err(err) => Err(err),
            };

            if let Ok((message, index, _)) = &resolved
                && let Err(err) = accept(message)
            {
                let mut event = MockAuditEvent::new("answer_rejected")
                    .with_request(request)
                    .with_detail(err.to_string());
                if let Some(index) = index {
                    event = event.with_index(*index);
                }
                drop(guard);
                self.audit.record(&event);
                return Err(err);
            }

            let (result, event) = match resolved {
                Ok((message, Some(index), discrepancy)) => {
                    state.recorder.observe(Some(index));
                    state.store.note_matched(index);
                    let event = match discrepancy {
                        Some(discrepancy) => {
                            let event = MockAuditEvent::new("partial_match")
                                .with_request(request)
                                .with_index(index)
                                .with_detail(discrepancy.to_string());
                            state.recorder.record_discrepancy(index, discrepancy);
                            event
                        }
                        None => MockAuditEvent::new("request_matched")
                            .with_request(request)
                            .with_index(index),
                    };
                    (Ok(message), event)
                }
                Ok((message, None, _)) => {
                    state.recorder.observe(None);
                    state.recorder.record_unexpected(request, true);
                    (Ok(message), MockAuditEvent::new("request_defaulted").with_request(request))
                }
                Err(err) => {
                    state.recorder.observe(None);
                    state.recorder.record_unexpected(request, false);
                    let event = MockAuditEvent::new("request_unmatched")
                        .with_request(request)
                        .with_detail(err.to_string());
                    (Err(MockError::NoMatch(err)), event)
                }
            };

            state.lifecycle = if request.kind == RequestKind::Termination && result.is_ok() {
                LifecycleState::Terminated
            } else {
                LifecycleState::ExchangeInProgress
            };
            (result, event)
        };
        self.audit.record(&event);
        result.map_err(E::from)
    }

    /// Returns one result per registered index.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn snapshot(&self) -> Result<BTreeSet<ExpectationResult>, MockError> {
        Ok(self.lock()?.recorder.snapshot())
    }

    /// Returns results, discrepancies, and unexpected requests.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn expectation_results(&self) -> Result<ExpectationReport, MockError> {
        Ok(self.lock()?.recorder.report())
    }

    /// Clears observations while keeping the registration set.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn reset_results(&self) -> Result<(), MockError> {
        self.lock()?.recorder.reset();
        self.audit.record(&MockAuditEvent::new("results_reset"));
        Ok(())
    }

    /// Discards expectations, default answer, and results.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn clear(&self) -> Result<(), MockError> {
        {
            let mut state = self.lock()?;
            state.store.clear();
            state.recorder.track(0);
            state.lifecycle = LifecycleState::Uninitialized;
            state.processed = 0;
        }
        self.audit.record(&MockAuditEvent::new("mock_cleared"));
        Ok(())
    }

    /// Returns the lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn lifecycle(&self) -> Result<LifecycleState, MockError> {
        Ok(self.lock()?.lifecycle)
    }

    /// Returns the number of requests processed since the last registration.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn processed_requests(&self) -> Result<u64, MockError> {
        Ok(self.lock()?.processed)
    }

    /// Returns the number of registered expectations.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::LockPoisoned`] when the engine lock is poisoned.
    pub fn registered(&self) -> Result<usize, MockError> {
        Ok(self.lock()?.store.len())
    }

    /// Returns the audit sink shared with collaborators of this engine.
    #[must_use]
    pub fn audit_sink(&self) -> Arc<dyn MockAuditSink> {
        Arc::clone(&self.audit)
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new(MockEngineConfig::default())
    }
}
