// crates/pcrf-mock-harness/tests/helpers/gateway.rs
// ============================================================================
// Module: Simulated Gateway
// Description: In-process enforcement point for harness scenarios.
// Purpose: Send real credit-control requests and shape traffic by QoS ceiling.
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use pcrf_mock_core::AnswerMessage;
use pcrf_mock_core::AuthOutcome;
use pcrf_mock_core::CollaboratorError;
use pcrf_mock_core::CreditControlRequest;
use pcrf_mock_core::Direction;
use pcrf_mock_core::DisconnectReceipt;
use pcrf_mock_core::MonitoringKey;
use pcrf_mock_core::RequestKind;
use pcrf_mock_core::SubjectId;
use pcrf_mock_core::SubscriberProvisioner;
use pcrf_mock_core::TrafficGenerator;
use pcrf_mock_core::TrafficRequest;
use pcrf_mock_core::UsageAccounting;
use pcrf_mock_core::UsageBySubject;
use pcrf_mock_harness::HarnessError;
use pcrf_mock_harness::ResponderClient;
use pcrf_mock_harness::SharedPolicy;
use serde_json::json;

/// Rate reported when no ceiling bounds the direction.
pub const UNSHAPED_BPS: f64 = 100_000_000.0;

#[derive(Default)]
struct GatewayState {
    provisioned: u32,
    next_sequence: BTreeMap<SubjectId, u32>,
    attached: BTreeSet<SubjectId>,
    usage: UsageBySubject,
    report_override: Option<String>,
}

/// Gateway that asks the mock for policy and enforces it on simulated traffic.
pub struct SimulatedGateway {
    client: ResponderClient,
    policy: SharedPolicy,
    monitoring_key: MonitoringKey,
    shaping: f64,
    state: Mutex<GatewayState>,
}

impl SimulatedGateway {
    /// Creates a gateway that delivers `shaping` times the ceiling in force.
    pub fn new(client: ResponderClient, policy: SharedPolicy, key: &str, shaping: f64) -> Self {
        Self {
            client,
            policy,
            monitoring_key: MonitoringKey::new(key),
            shaping,
            state: Mutex::new(GatewayState::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GatewayState>, CollaboratorError> {
        self.state.lock().map_err(|_| CollaboratorError::Unavailable("gateway state poisoned".to_string()))
    }

    /// Replaces every subsequent traffic report with `raw`.
    pub fn override_report(&self, raw: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.report_override = Some(raw.to_string());
        }
    }

    /// Returns true when the subject is attached.
    pub fn is_attached(&self, subject_id: &SubjectId) -> bool {
        self.state.lock().is_ok_and(|state| state.attached.contains(subject_id))
    }

    fn next_sequence(&self, subject_id: &SubjectId) -> Result<u32, CollaboratorError> {
        let mut state = self.lock()?;
        let slot = state.next_sequence.entry(subject_id.clone()).or_insert(1);
        let sequence = *slot;
        *slot += 1;
        Ok(sequence)
    }

    /// Sends a usage-report update for an attached subject.
    pub async fn send_update(
        &self,
        subject_id: &SubjectId,
        bytes_used: u64,
    ) -> Result<AnswerMessage, HarnessError> {
        let sequence = self.next_sequence(subject_id)?;
        let request = CreditControlRequest::new(subject_id.clone(), RequestKind::Update, sequence)
            .with_usage_report(self.monitoring_key.clone(), bytes_used);
        self.client.exchange(request).await
    }
}

impl SubscriberProvisioner for SimulatedGateway {
    fn configure_subjects(&self, count: usize) -> Result<Vec<SubjectId>, CollaboratorError> {
        let mut state = self.lock()?;
        let mut subjects = Vec::with_capacity(count);
        for _ in 0 .. count {
            state.provisioned += 1;
            subjects.push(SubjectId::new(format!("001010{:09}", state.provisioned)));
        }
        Ok(subjects)
    }

    fn authenticate(&self, subject_id: &SubjectId) -> Result<AuthOutcome, CollaboratorError> {
        self.lock()?.next_sequence.insert(subject_id.clone(), 1);
        let sequence = self.next_sequence(subject_id)?;
        let request = CreditControlRequest::new(subject_id.clone(), RequestKind::Initial, sequence);
        match self.client.blocking_exchange(request) {
            Ok(message) if message.answer.result_code.is_success() => {
                self.lock()?.attached.insert(subject_id.clone());
                Ok(AuthOutcome::Success)
            }
            Ok(_) => Ok(AuthOutcome::Failure),
            Err(HarnessError::ResponderClosed) => {
                Err(CollaboratorError::Unavailable("policy server unreachable".to_string()))
            }
            Err(_) => Ok(AuthOutcome::Failure),
        }
    }

    fn disconnect(&self, subject_id: &SubjectId) -> Result<DisconnectReceipt, CollaboratorError> {
        if !self.lock()?.attached.remove(subject_id) {
            return Err(CollaboratorError::Rejected(format!("{subject_id} is not attached")));
        }
        let sequence = self.next_sequence(subject_id)?;
        let request =
            CreditControlRequest::new(subject_id.clone(), RequestKind::Termination, sequence);
        match self.client.blocking_exchange(request) {
            Err(HarnessError::ResponderClosed) => {
                Err(CollaboratorError::Unavailable("policy server unreachable".to_string()))
            }
            Ok(_) | Err(_) => Ok(DisconnectReceipt {
                subject_id: subject_id.clone(),
            }),
        }
    }
}

impl TrafficGenerator for SimulatedGateway {
    fn generate_traffic(&self, request: &TrafficRequest) -> Result<String, CollaboratorError> {
        if !self.is_attached(&request.subject_id) {
            return Err(CollaboratorError::Rejected(format!(
                "{} is not attached",
                request.subject_id
            )));
        }
        let ceiling = self.policy.ceiling(&self.monitoring_key, request.direction).ok();
        let holder = self.policy.holder(&self.monitoring_key).ok().flatten();
        let bps = ceiling.map_or(UNSHAPED_BPS, |bound| bound as f64 * self.shaping);

        let mut state = self.lock()?;
        if let Some(rule_id) = holder {
            let record = state
                .usage
                .entry(request.subject_id.accounting_key())
                .or_default()
                .entry(rule_id)
                .or_default();
            match request.direction {
                Direction::Uplink => record.bytes_tx += request.volume_bytes,
                Direction::Downlink => record.bytes_rx += request.volume_bytes,
            }
        }
        if let Some(raw) = &state.report_override {
            return Ok(raw.clone());
        }
        let seconds = request.volume_bytes as f64 * 8.0 / bps;
        let summary = json!({
            "bits_per_second": bps,
            "bytes": request.volume_bytes,
            "seconds": seconds,
        });
        Ok(json!({
            "start": { "test_start": { "protocol": "TCP", "reverse": request.direction == Direction::Downlink } },
            "end": { "sum_sent": summary, "sum_received": summary },
        })
        .to_string())
    }
}

impl UsageAccounting for SimulatedGateway {
    fn policy_usage_by_subject(&self) -> Result<UsageBySubject, CollaboratorError> {
        Ok(self.lock()?.usage.clone())
    }
}
