// crates/pcrf-mock-core/src/interfaces/mod.rs
// ============================================================================
// Module: PCRF Mock Interfaces
// Description: Contracts for subscriber, rule, traffic, and usage collaborators.
// Purpose: Define the external surfaces a scenario drives around the mock engine.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The mock engine never provisions subscribers, persists rules, or moves
//! traffic itself. Scenarios reach those systems through the traits below;
//! implementations may wrap a live gateway or an in-process simulation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Direction;
use crate::core::PolicyRule;
use crate::core::RuleId;
use crate::core::SubjectId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Collaborator failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// Collaborator could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// Collaborator rejected the request.
    #[error("collaborator rejected request: {0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Subscriber Provisioning
// ============================================================================

/// Result of an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    /// Subscriber attached.
    Success,
    /// Subscriber was rejected.
    Failure,
}

/// Acknowledgement that a disconnect was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectReceipt {
    /// Subject that was disconnected.
    pub subject_id: SubjectId,
}

/// Subscriber identity and session provisioning.
pub trait SubscriberProvisioner {
    /// Provisions `count` subscribers and returns their identities.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when provisioning fails.
    fn configure_subjects(&self, count: usize) -> Result<Vec<SubjectId>, CollaboratorError>;

    /// Attaches a subscriber, which drives an INITIAL request toward the mock.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the attach cannot be attempted.
    fn authenticate(&self, subject_id: &SubjectId) -> Result<AuthOutcome, CollaboratorError>;

    /// Detaches a subscriber, which drives a TERMINATION request toward the mock.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the detach fails.
    fn disconnect(&self, subject_id: &SubjectId) -> Result<DisconnectReceipt, CollaboratorError>;
}

// ============================================================================
// SECTION: Rule Provisioning
// ============================================================================

/// Static rule persistence.
pub trait RuleProvisioner {
    /// Installs a static rule so answers can reference it by id.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the rule cannot be stored.
    fn install_static_rule(&self, rule: &PolicyRule) -> Result<(), CollaboratorError>;

    /// Removes every rule installed through this provisioner.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when removal fails.
    fn remove_all_installed_rules(&self) -> Result<(), CollaboratorError>;
}

// ============================================================================
// SECTION: Traffic Generation
// ============================================================================

/// Traffic generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRequest {
    /// Subscriber to generate traffic for.
    pub subject_id: SubjectId,
    /// Volume to transfer in bytes.
    pub volume_bytes: u64,
    /// Traffic direction.
    pub direction: Direction,
}

/// Data-plane traffic generator.
pub trait TrafficGenerator {
    /// Generates traffic and returns the raw JSON measurement report.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when traffic could not be generated.
    fn generate_traffic(&self, request: &TrafficRequest) -> Result<String, CollaboratorError>;
}

// ============================================================================
// SECTION: Usage Accounting
// ============================================================================

/// Per-rule usage counters reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Bytes received by the subscriber.
    pub bytes_rx: u64,
    /// Bytes sent by the subscriber.
    pub bytes_tx: u64,
}

/// Usage records keyed by subject accounting key, then by rule.
pub type UsageBySubject = BTreeMap<String, BTreeMap<RuleId, UsageRecord>>;

/// Gateway usage accounting.
pub trait UsageAccounting {
    /// Returns usage records for every tracked subject.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the query fails.
    fn policy_usage_by_subject(&self) -> Result<UsageBySubject, CollaboratorError>;
}
