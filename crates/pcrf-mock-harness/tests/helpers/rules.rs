// crates/pcrf-mock-harness/tests/helpers/rules.rs
// ============================================================================
// Module: Recording Rule Provisioner
// Description: Rule provisioner that records installs and removals in memory.
// ============================================================================

use std::sync::Mutex;

use pcrf_mock_core::CollaboratorError;
use pcrf_mock_core::PolicyRule;
use pcrf_mock_core::RuleId;
use pcrf_mock_core::RuleProvisioner;

#[derive(Default)]
struct RuleState {
    installed: Vec<RuleId>,
    removals: usize,
}

/// In-memory static rule store.
#[derive(Default)]
pub struct RecordingRuleProvisioner {
    state: Mutex<RuleState>,
}

impl RecordingRuleProvisioner {
    /// Returns rules installed and not yet removed.
    pub fn installed(&self) -> Vec<RuleId> {
        self.state.lock().map_or_else(|_| Vec::new(), |state| state.installed.clone())
    }

    /// Returns how many times all rules were removed.
    pub fn removals(&self) -> usize {
        self.state.lock().map_or(0, |state| state.removals)
    }
}

impl RuleProvisioner for RecordingRuleProvisioner {
    fn install_static_rule(&self, rule: &PolicyRule) -> Result<(), CollaboratorError> {
        let mut state =
            self.state.lock().map_err(|_| CollaboratorError::Unavailable("rule store poisoned".to_string()))?;
        if state.installed.contains(&rule.id) {
            return Err(CollaboratorError::Rejected(format!("rule {} already installed", rule.id)));
        }
        state.installed.push(rule.id.clone());
        Ok(())
    }

    fn remove_all_installed_rules(&self) -> Result<(), CollaboratorError> {
        let mut state =
            self.state.lock().map_err(|_| CollaboratorError::Unavailable("rule store poisoned".to_string()))?;
        state.installed.clear();
        state.removals += 1;
        Ok(())
    }
}
