// crates/pcrf-mock-harness/src/policy.rs
// ============================================================================
// Module: Shared Policy Ledger
// Description: Rule catalog and QoS ceilings shared by responder and collaborators.
// Purpose: Track which QoS bounds the answers sent so far have put in force.
// Dependencies: pcrf-mock-core
// ============================================================================

//! ## Overview
//! The responder applies every successful answer to the ledger; simulated or
//! live enforcement points read ceilings back when shaping or checking
//! traffic. Installed rules must be registered here before any answer refers
//! to them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use pcrf_mock_core::CreditControlAnswer;
use pcrf_mock_core::Direction;
use pcrf_mock_core::MonitoringKey;
use pcrf_mock_core::PolicyRule;
use pcrf_mock_core::QosCeilings;
use pcrf_mock_core::RuleCatalog;
use pcrf_mock_core::RuleId;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Catalog plus ceilings under one lock.
#[derive(Debug, Default)]
struct PolicyState {
    /// Static rules installed for the scenario.
    catalog: RuleCatalog,
    /// Ceilings in force per monitoring key.
    ceilings: QosCeilings,
}

/// Cloneable handle to the scenario's policy ledger.
#[derive(Debug, Clone, Default)]
pub struct SharedPolicy {
    /// Shared state.
    inner: Arc<Mutex<PolicyState>>,
}

impl SharedPolicy {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the ledger lock.
    fn lock(&self) -> Result<MutexGuard<'_, PolicyState>, HarnessError> {
        self.inner.lock().map_err(|_| HarnessError::LockPoisoned)
    }

    /// Validates and registers a static rule.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when the rule is invalid.
    pub fn register_rule(&self, rule: PolicyRule) -> Result<(), HarnessError> {
        self.lock()?.catalog.insert(rule)?;
        Ok(())
    }

    /// Applies an answer's rule installs and removals.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when the answer names an
    /// unregistered rule; the ledger is unchanged in that case.
    pub fn apply_answer(&self, answer: &CreditControlAnswer) -> Result<(), HarnessError> {
        let mut state = self.lock()?;
        let PolicyState {
            catalog,
            ceilings,
        } = &mut *state;
        ceilings.apply(answer, catalog)?;
        Ok(())
    }

    /// Returns the ceiling in force for a key and direction.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when no installed rule bounds
    /// that direction.
    pub fn ceiling(&self, key: &MonitoringKey, direction: Direction) -> Result<u64, HarnessError> {
        Ok(self.lock()?.ceilings.ceiling(key, direction)?)
    }

    /// Returns the rule currently holding a key's ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::LockPoisoned`] when the ledger lock is poisoned.
    pub fn holder(&self, key: &MonitoringKey) -> Result<Option<RuleId>, HarnessError> {
        Ok(self.lock()?.ceilings.installed(key).map(|installed| installed.rule_id.clone()))
    }

    /// Returns the number of registered rules.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::LockPoisoned`] when the ledger lock is poisoned.
    pub fn rule_count(&self) -> Result<usize, HarnessError> {
        Ok(self.lock()?.catalog.len())
    }

    /// Drops ceilings and registered rules.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::LockPoisoned`] when the ledger lock is poisoned.
    pub fn clear(&self) -> Result<(), HarnessError> {
        let mut state = self.lock()?;
        state.ceilings.clear();
        state.catalog.clear();
        Ok(())
    }
}
