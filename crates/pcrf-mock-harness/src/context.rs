// crates/pcrf-mock-harness/src/context.rs
// ============================================================================
// Module: Scenario Context
// Description: Driver API binding the engine, responder, ledger, and collaborators.
// Purpose: Give scenarios one handle for expectations, provisioning, and verification.
// Dependencies: pcrf-mock-core, pcrf-mock-config, tokio
// ============================================================================

//! ## Overview
//! A [`ScenarioContext`] owns one engine, its responder task, and the shared
//! policy ledger, plus the external collaborators a scenario drives.
//! Collaborator traits are synchronous, so the context runs them on the
//! blocking pool. [`ScenarioGuard`] clears the mock and removes installed
//! rules when dropped, including on early return or panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use pcrf_mock_config::PcrfMockConfig;
use pcrf_mock_config::WaitPolicy;
use pcrf_mock_core::AuthOutcome;
use pcrf_mock_core::CollaboratorError;
use pcrf_mock_core::CreditControlAnswer;
use pcrf_mock_core::Direction;
use pcrf_mock_core::DisconnectReceipt;
use pcrf_mock_core::ExpectationReport;
use pcrf_mock_core::ExpectationResult;
use pcrf_mock_core::ExpectationSpec;
use pcrf_mock_core::MockAuditSink;
use pcrf_mock_core::MockEngine;
use pcrf_mock_core::MonitoringKey;
use pcrf_mock_core::PolicyRule;
use pcrf_mock_core::RuleProvisioner;
use pcrf_mock_core::SubjectId;
use pcrf_mock_core::SubscriberProvisioner;
use pcrf_mock_core::TrafficGenerator;
use pcrf_mock_core::TrafficRequest;
use pcrf_mock_core::UsageAccounting;
use pcrf_mock_core::UsageBySubject;
use pcrf_mock_core::VerificationOutcome;
use pcrf_mock_core::verify_rate;
use tokio::task;

use crate::enforcement::RateBounds;
use crate::enforcement::verify_measured_rate;
use crate::error::HarnessError;
use crate::policy::SharedPolicy;
use crate::responder::Responder;
use crate::responder::ResponderClient;
use crate::wait::await_measurement;
use crate::wait::wait_for_expectations;
use crate::wait::wait_for_round_trips;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Harness tunables derived from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarnessSettings {
    /// Bounded wait durations.
    pub wait: WaitPolicy,
    /// Relative tolerance for rate verification.
    pub tolerance: f64,
}

impl HarnessSettings {
    /// Extracts harness settings from a validated configuration.
    #[must_use]
    pub const fn from_config(config: &PcrfMockConfig) -> Self {
        Self {
            wait: config.wait_policy(),
            tolerance: config.relative_tolerance(),
        }
    }
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self::from_config(&PcrfMockConfig::default())
    }
}

/// External systems a scenario drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Subscriber provisioning and attach/detach.
    pub subscribers: Arc<dyn SubscriberProvisioner + Send + Sync>,
    /// Static rule provisioning.
    pub rules: Arc<dyn RuleProvisioner + Send + Sync>,
    /// Traffic generation and measurement.
    pub traffic: Arc<dyn TrafficGenerator + Send + Sync>,
    /// Per-subject usage accounting.
    pub accounting: Arc<dyn UsageAccounting + Send + Sync>,
}

// ============================================================================
// SECTION: Scenario Context
// ============================================================================

/// One running scenario.
pub struct ScenarioContext {
    /// Mock engine answering requests.
    engine: Arc<MockEngine>,
    /// Rule catalog and ceilings in force.
    policy: SharedPolicy,
    /// Responder task in front of the engine.
    responder: Responder,
    /// External collaborators.
    collaborators: Collaborators,
    /// Harness tunables.
    settings: HarnessSettings,
    /// Audit sink shared with the engine.
    audit: Arc<dyn MockAuditSink>,
}

impl ScenarioContext {
    /// Assembles a context from already-running parts.
    #[must_use]
    pub fn new(
        engine: Arc<MockEngine>,
        policy: SharedPolicy,
        responder: Responder,
        collaborators: Collaborators,
        settings: HarnessSettings,
    ) -> Self {
        let audit = engine.audit_sink();
        Self {
            engine,
            policy,
            responder,
            collaborators,
            settings,
            audit,
        }
    }

    /// Builds the engine, ledger, and responder from configuration, then
    /// lets `connect` wire collaborators to the responder and ledger.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the configuration is invalid or
    /// its audit sink cannot be opened, and [`HarnessError::Runtime`] outside
    /// a tokio runtime.
    pub fn from_config<F>(config: &PcrfMockConfig, connect: F) -> Result<Self, HarnessError>
    where
        F: FnOnce(ResponderClient, SharedPolicy) -> Collaborators,
    {
        config.validate()?;
        let engine = Arc::new(MockEngine::with_audit_sink(config.engine_config(), config.audit_sink()?));
        let policy = SharedPolicy::new();
        let responder = Responder::spawn(Arc::clone(&engine), policy.clone())?;
        let collaborators = connect(responder.client(), policy.clone());
        Ok(Self::new(engine, policy, responder, collaborators, HarnessSettings::from_config(config)))
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &MockEngine {
        &self.engine
    }

    /// Returns the policy ledger.
    #[must_use]
    pub const fn policy(&self) -> &SharedPolicy {
        &self.policy
    }

    /// Returns a responder client.
    #[must_use]
    pub fn client(&self) -> ResponderClient {
        self.responder.client()
    }

    /// Returns the harness settings.
    #[must_use]
    pub const fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Returns a guard that clears this scenario when dropped.
    #[must_use]
    pub fn guard(&self) -> ScenarioGuard {
        ScenarioGuard {
            engine: Arc::clone(&self.engine),
            policy: self.policy.clone(),
            rules: Arc::clone(&self.collaborators.rules),
        }
    }

    // ------------------------------------------------------------------------
    // Driver API
    // ------------------------------------------------------------------------

    /// Registers expectations and an optional default answer.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Mock`] when the engine lock is poisoned.
    pub fn set_expectations(
        &self,
        specs: Vec<ExpectationSpec>,
        default_answer: Option<CreditControlAnswer>,
    ) -> Result<usize, HarnessError> {
        Ok(self.engine.set_expectations(specs, default_answer)?)
    }

    /// Returns results, per-index discrepancies, and unexpected requests.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Mock`] when the engine lock is poisoned.
    pub fn get_expectation_results(&self) -> Result<ExpectationReport, HarnessError> {
        Ok(self.engine.expectation_results()?)
    }

    /// Discards expectations, default answer, and results.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Mock`] when the engine lock is poisoned.
    pub fn clear_mock(&self) -> Result<(), HarnessError> {
        Ok(self.engine.clear()?)
    }

    /// Checks an observed rate. `tolerance` overrides the configured
    /// relative tolerance when given.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when the bounds are invalid.
    pub fn verify_rate(
        &self,
        observed_bps: f64,
        upper_bound_bps: f64,
        lower_bound_bps: f64,
        tolerance: Option<f64>,
    ) -> Result<VerificationOutcome, HarnessError> {
        let tolerance = tolerance.unwrap_or(self.settings.tolerance);
        Ok(verify_rate(observed_bps, upper_bound_bps, lower_bound_bps, tolerance)?)
    }

    // ------------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------------

    /// Validates a rule, registers it in the ledger, and provisions it.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] for an invalid rule and
    /// [`HarnessError::Collaborator`] when provisioning fails.
    pub async fn install_static_rule(&self, rule: PolicyRule) -> Result<(), HarnessError> {
        self.policy.register_rule(rule.clone())?;
        let rules = Arc::clone(&self.collaborators.rules);
        blocking(move || rules.install_static_rule(&rule)).await
    }

    /// Provisions `count` subjects.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Collaborator`] when provisioning fails.
    pub async fn configure_subjects(&self, count: usize) -> Result<Vec<SubjectId>, HarnessError> {
        let subscribers = Arc::clone(&self.collaborators.subscribers);
        blocking(move || subscribers.configure_subjects(count)).await
    }

    /// Attaches a subject, which triggers the initial credit-control request.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Collaborator`] when the attach fails.
    pub async fn authenticate(&self, subject_id: &SubjectId) -> Result<AuthOutcome, HarnessError> {
        let subscribers = Arc::clone(&self.collaborators.subscribers);
        let subject_id = subject_id.clone();
        blocking(move || subscribers.authenticate(&subject_id)).await
    }

    /// Detaches a subject, which triggers the termination request.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Collaborator`] when the detach fails.
    pub async fn disconnect(&self, subject_id: &SubjectId) -> Result<DisconnectReceipt, HarnessError> {
        let subscribers = Arc::clone(&self.collaborators.subscribers);
        let subject_id = subject_id.clone();
        blocking(move || subscribers.disconnect(&subject_id)).await
    }

    /// Reads per-subject, per-rule usage counters.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Collaborator`] when accounting is unavailable.
    pub async fn usage_by_subject(&self) -> Result<UsageBySubject, HarnessError> {
        let accounting = Arc::clone(&self.collaborators.accounting);
        blocking(move || accounting.policy_usage_by_subject()).await
    }

    // ------------------------------------------------------------------------
    // Waits and Verification
    // ------------------------------------------------------------------------

    /// Waits until the result snapshot equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Timeout`] when results do not converge.
    pub async fn wait_for_expectations(
        &self,
        expected: &BTreeSet<ExpectationResult>,
    ) -> Result<BTreeSet<ExpectationResult>, HarnessError> {
        wait_for_expectations(&self.engine, expected, &self.settings.wait).await
    }

    /// Waits until at least `count` requests were processed.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Timeout`] when fewer requests arrive.
    pub async fn wait_for_round_trips(&self, count: u64) -> Result<u64, HarnessError> {
        wait_for_round_trips(&self.engine, count, &self.settings.wait).await
    }

    /// Generates traffic for a subject and checks the measured rate against
    /// the ceiling currently in force for `key` and `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Configuration`] when no ceiling is in force,
    /// [`HarnessError::Measurement`] for a malformed report, and
    /// [`HarnessError::Timeout`] or [`HarnessError::Collaborator`] when the
    /// measurement itself fails.
    pub async fn verify_egress_rate(
        &self,
        subject_id: &SubjectId,
        key: &MonitoringKey,
        direction: Direction,
        volume_bytes: u64,
        lower_bps: f64,
    ) -> Result<VerificationOutcome, HarnessError> {
        let upper_bps = self.policy.ceiling(key, direction)?;
        let request = TrafficRequest {
            subject_id: subject_id.clone(),
            volume_bytes,
            direction,
        };
        let report =
            await_measurement(Arc::clone(&self.collaborators.traffic), request, &self.settings.wait)
                .await?;
        let bounds = RateBounds {
            upper_bps,
            lower_bps,
            tolerance: self.settings.tolerance,
        };
        verify_measured_rate(&report, bounds, self.audit.as_ref())
    }

    /// Stops the responder task.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Runtime`] when the responder task panicked.
    pub async fn shutdown(self) -> Result<(), HarnessError> {
        self.responder.shutdown().await
    }
}

/// Runs a synchronous collaborator call on the blocking pool.
async fn blocking<T, F>(operation: F) -> Result<T, HarnessError>
where
    F: FnOnce() -> Result<T, CollaboratorError> + Send + 'static,
    T: Send + 'static,
{
    let joined =
        task::spawn_blocking(operation).await.map_err(|err| HarnessError::Runtime(err.to_string()))?;
    Ok(joined?)
}

// ============================================================================
// SECTION: Scenario Guard
// ============================================================================

/// Clears the mock, the policy ledger, and installed rules on drop.
///
/// Cleanup is best-effort; failures are ignored because drop cannot report them.
pub struct ScenarioGuard {
    /// Engine to clear.
    engine: Arc<MockEngine>,
    /// Ledger to clear.
    policy: SharedPolicy,
    /// Provisioner whose installed rules are removed.
    rules: Arc<dyn RuleProvisioner + Send + Sync>,
}

impl Drop for ScenarioGuard {
    fn drop(&mut self) {
        let _ = self.engine.clear();
        let _ = self.policy.clear();
        let _ = self.rules.remove_all_installed_rules();
    }
}
