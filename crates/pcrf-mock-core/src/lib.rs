// crates/pcrf-mock-core/src/lib.rs
// ============================================================================
// Module: PCRF Mock Core Library
// Description: Public API surface for the credit-control mock engine.
// Purpose: Expose message types, collaborator interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! PCRF mock core provides an expectation-based responder for credit-control
//! request/answer exchanges and a tolerant rate verifier for checking that a
//! policy-enforcement gateway throttles traffic to the QoS the mock installed.
//! Collaborators (subscriber provisioning, rule storage, traffic generation)
//! are reached only through [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AuthOutcome;
pub use interfaces::CollaboratorError;
pub use interfaces::DisconnectReceipt;
pub use interfaces::RuleProvisioner;
pub use interfaces::SubscriberProvisioner;
pub use interfaces::TrafficGenerator;
pub use interfaces::TrafficRequest;
pub use interfaces::UsageAccounting;
pub use interfaces::UsageBySubject;
pub use interfaces::UsageRecord;
pub use runtime::LifecycleState;
pub use runtime::MatchPolicy;
pub use runtime::MockAuditEvent;
pub use runtime::MockAuditSink;
pub use runtime::MockEngine;
pub use runtime::MockEngineConfig;
pub use runtime::MockError;
pub use runtime::NoMatchError;
pub use runtime::QosCeilings;
pub use runtime::RuleCatalog;
pub use runtime::VerificationOutcome;
pub use runtime::verify_rate;
