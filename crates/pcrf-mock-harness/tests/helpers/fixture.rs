// crates/pcrf-mock-harness/tests/helpers/fixture.rs
// ============================================================================
// Module: Scenario Fixture
// Description: Wires engine, responder, ledger, and fake collaborators.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use pcrf_mock_config::WaitPolicy;
use pcrf_mock_core::CreditControlAnswer;
use pcrf_mock_core::FlowQos;
use pcrf_mock_core::MockEngine;
use pcrf_mock_core::MockEngineConfig;
use pcrf_mock_core::MonitoringKey;
use pcrf_mock_core::PolicyRule;
use pcrf_mock_core::RuleId;
use pcrf_mock_core::TrackingType;
use pcrf_mock_core::UsageQuota;
use pcrf_mock_harness::Collaborators;
use pcrf_mock_harness::HarnessError;
use pcrf_mock_harness::HarnessSettings;
use pcrf_mock_harness::Responder;
use pcrf_mock_harness::ScenarioContext;
use pcrf_mock_harness::SharedPolicy;

use super::audit::RecordingSink;
use super::gateway::SimulatedGateway;
use super::rules::RecordingRuleProvisioner;

/// Monitoring key shared by fixture rules.
pub const MONITORING_KEY: &str = "mkey-ota";

/// Running scenario plus handles on its fakes.
pub struct Fixture {
    pub context: ScenarioContext,
    pub gateway: Arc<SimulatedGateway>,
    pub rules: Arc<RecordingRuleProvisioner>,
    pub sink: Arc<RecordingSink>,
}

/// Short waits so timeouts surface quickly in tests.
pub fn fast_settings() -> HarnessSettings {
    HarnessSettings {
        wait: WaitPolicy {
            expectation_timeout: Duration::from_secs(2),
            measurement_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(5),
        },
        tolerance: 0.05,
    }
}

/// Starts a scenario whose gateway delivers `shaping` times the ceiling.
pub fn start(shaping: f64, settings: HarnessSettings) -> Result<Fixture, HarnessError> {
    start_with(MockEngineConfig::default(), shaping, settings)
}

/// Starts a scenario with an explicit engine configuration.
pub fn start_with(
    config: MockEngineConfig,
    shaping: f64,
    settings: HarnessSettings,
) -> Result<Fixture, HarnessError> {
    let sink = Arc::new(RecordingSink::default());
    let engine = Arc::new(MockEngine::with_audit_sink(config, sink.clone()));
    let policy = SharedPolicy::new();
    let responder = Responder::spawn(Arc::clone(&engine), policy.clone())?;
    let gateway =
        Arc::new(SimulatedGateway::new(responder.client(), policy.clone(), MONITORING_KEY, shaping));
    let rules = Arc::new(RecordingRuleProvisioner::default());
    let collaborators = Collaborators {
        subscribers: gateway.clone(),
        rules: rules.clone(),
        traffic: gateway.clone(),
        accounting: gateway.clone(),
    };
    let context = ScenarioContext::new(engine, policy, responder, collaborators, settings);
    Ok(Fixture {
        context,
        gateway,
        rules,
        sink,
    })
}

/// Builds a rule on the fixture monitoring key.
pub fn rule(id: &str, priority: u32, qos: FlowQos) -> PolicyRule {
    PolicyRule {
        id: RuleId::new(id),
        monitoring_key: MonitoringKey::new(MONITORING_KEY),
        priority,
        tracking_type: TrackingType::OnlyPcrf,
        qos: Some(qos),
    }
}

/// Success answer installing `rule_id` with a 1 MiB rule-level quota.
pub fn install_answer(rule_id: &str) -> CreditControlAnswer {
    CreditControlAnswer::success()
        .with_static_rules([rule_id], Vec::<String>::new())
        .with_usage_monitor(MONITORING_KEY, UsageQuota::rule_level(1_048_576))
}
