// crates/pcrf-mock-core/src/core/mod.rs
// ============================================================================
// Module: PCRF Mock Core Types
// Description: Message model, expectations, rules, and measurement schemas.
// Purpose: Provide stable, serializable types shared by the engine and harness.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are the canonical model for the credit-control mock: the
//! request/answer pair, registered expectations and their results, static
//! policy rules, and throughput measurement reports.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod expectation;
pub mod identifiers;
pub mod measurement;
pub mod message;
pub mod rule;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::ConfigurationError;
pub use error::MeasurementUnavailableError;
pub use expectation::Expectation;
pub use expectation::ExpectationReport;
pub use expectation::ExpectationResult;
pub use expectation::ExpectationSpec;
pub use expectation::PartialMatchDiscrepancy;
pub use expectation::RepeatPolicy;
pub use expectation::RequestMatcher;
pub use expectation::UnexpectedRequest;
pub use expectation::UsageComparison;
pub use identifiers::ExpectationIndex;
pub use identifiers::MonitoringKey;
pub use identifiers::RuleId;
pub use identifiers::SubjectId;
pub use measurement::MeasurementEnd;
pub use measurement::MeasurementReport;
pub use measurement::StreamSummary;
pub use message::AnswerMessage;
pub use message::CreditControlAnswer;
pub use message::CreditControlRequest;
pub use message::MonitoringLevel;
pub use message::RequestKind;
pub use message::ResultCode;
pub use message::UsageQuota;
pub use rule::Direction;
pub use rule::FlowQos;
pub use rule::PolicyRule;
pub use rule::TrackingType;
