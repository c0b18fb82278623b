// crates/pcrf-mock-core/src/runtime/mod.rs
// ============================================================================
// Module: PCRF Mock Runtime
// Description: Expectation matching engine, answer synthesis, and rate verification.
// Purpose: Answer credit-control requests and verify enforced throughput.
// Dependencies: crate::core, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Runtime modules implement the mock engine and its leaves: the expectation
//! store and matcher, the response synthesizer, the result recorder, the rate
//! verifier, the QoS ceiling ledger, and audit sinks. Every inbound request
//! goes through [`MockEngine::handle_request`].

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod ceilings;
pub mod engine;
pub mod recorder;
pub mod store;
pub mod synthesizer;
pub mod verifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::MockAuditEvent;
pub use audit::MockAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use ceilings::InstalledQos;
pub use ceilings::QosCeilings;
pub use ceilings::RuleCatalog;
pub use engine::LifecycleState;
pub use engine::MockEngine;
pub use engine::MockEngineConfig;
pub use engine::MockError;
pub use recorder::ResultRecorder;
pub use store::ExpectationStore;
pub use store::MatchOutcome;
pub use store::MatchPolicy;
pub use store::NoMatchError;
pub use synthesizer::AnswerSource;
pub use synthesizer::synthesize;
pub use synthesizer::synthesize_message;
pub use verifier::RateFailure;
pub use verifier::RateSample;
pub use verifier::VerificationOutcome;
pub use verifier::verify_rate;
