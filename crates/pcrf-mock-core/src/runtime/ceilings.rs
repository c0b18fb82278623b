// crates/pcrf-mock-core/src/runtime/ceilings.rs
// ============================================================================
// Module: QoS Ceiling Ledger
// Description: Rule catalog and per-monitoring-key QoS ceilings in force.
// Purpose: Derive the rate-verification upper bound from answers actually sent.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Every rule an answer installs stays active for its monitoring key until an
//! answer removes it. The ceiling in force for a key comes from the active
//! rule with the lowest priority value; among equal priorities the most
//! recently installed rule wins. Removing the rule in force hands the key
//! back to the next active rule.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::core::ConfigurationError;
use crate::core::CreditControlAnswer;
use crate::core::Direction;
use crate::core::FlowQos;
use crate::core::MonitoringKey;
use crate::core::PolicyRule;
use crate::core::RuleId;

// ============================================================================
// SECTION: Rule Catalog
// ============================================================================

/// Validated static rules known to the scenario.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    /// Rules by id.
    rules: BTreeMap<RuleId, PolicyRule>,
}

impl RuleCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and adds a rule, replacing any rule with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidRule`] when validation fails.
    pub fn insert(&mut self, rule: PolicyRule) -> Result<(), ConfigurationError> {
        rule.validate()?;
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Looks up a rule.
    #[must_use]
    pub fn get(&self, id: &RuleId) -> Option<&PolicyRule> {
        self.rules.get(id)
    }

    /// Removes all rules.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// SECTION: Ceilings
// ============================================================================

/// QoS bounds in force for one monitoring key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstalledQos<'a> {
    /// Rule that set the ceiling.
    pub rule_id: &'a RuleId,
    /// Bounds from that rule.
    pub qos: FlowQos,
}

/// One installed rule for a monitoring key.
#[derive(Debug, Clone)]
struct ActiveRule {
    /// Installed rule.
    rule_id: RuleId,
    /// Rule priority (lower wins).
    priority: u32,
    /// Install order across the ledger.
    installed_at: u64,
    /// Bounds from the rule.
    qos: FlowQos,
}

/// Ceilings by monitoring key.
#[derive(Debug, Clone, Default)]
pub struct QosCeilings {
    /// Active rules by key.
    by_key: BTreeMap<MonitoringKey, Vec<ActiveRule>>,
    /// Next install sequence number.
    next_install: u64,
}

impl QosCeilings {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an answer's removals, then its installs.
    ///
    /// Re-installing an active rule refreshes its install order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownRule`] when the answer references a
    /// rule missing from the catalog. The ledger is left unchanged in that case.
    pub fn apply(
        &mut self,
        answer: &CreditControlAnswer,
        catalog: &RuleCatalog,
    ) -> Result<(), ConfigurationError> {
        let lookup = |id: &RuleId| {
            catalog.get(id).ok_or_else(|| ConfigurationError::UnknownRule(id.to_string()))
        };
        let removals = answer.rule_removals.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;
        let installs = answer.rule_installs.iter().map(lookup).collect::<Result<Vec<_>, _>>()?;

        for rule in removals {
            self.deactivate(&rule.monitoring_key, &rule.id);
        }
        for rule in installs {
            self.deactivate(&rule.monitoring_key, &rule.id);
            let installed_at = self.next_install;
            self.next_install = self.next_install.saturating_add(1);
            self.by_key.entry(rule.monitoring_key.clone()).or_default().push(ActiveRule {
                rule_id: rule.id.clone(),
                priority: rule.priority,
                installed_at,
                qos: rule.qos.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Drops one rule from a key, forgetting the key once nothing is active.
    fn deactivate(&mut self, key: &MonitoringKey, rule_id: &RuleId) {
        if let Some(active) = self.by_key.get_mut(key) {
            active.retain(|entry| entry.rule_id != *rule_id);
            if active.is_empty() {
                self.by_key.remove(key);
            }
        }
    }

    /// Returns the active rule in force for a key.
    fn in_force(&self, key: &MonitoringKey) -> Option<&ActiveRule> {
        self.by_key
            .get(key)?
            .iter()
            .min_by_key(|entry| (entry.priority, Reverse(entry.installed_at)))
    }

    /// Returns the bounds in force for a key.
    #[must_use]
    pub fn installed(&self, key: &MonitoringKey) -> Option<InstalledQos<'_>> {
        self.in_force(key).map(|entry| InstalledQos {
            rule_id: &entry.rule_id,
            qos: entry.qos,
        })
    }

    /// Returns the ceiling for a key and direction.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingCeiling`] when no installed rule
    /// bounds that direction.
    pub fn ceiling(
        &self,
        key: &MonitoringKey,
        direction: Direction,
    ) -> Result<u64, ConfigurationError> {
        self.in_force(key).and_then(|entry| entry.qos.bound(direction)).ok_or_else(|| {
            ConfigurationError::MissingCeiling {
                key: key.to_string(),
                direction: direction.as_str(),
            }
        })
    }

    /// Drops all ceilings.
    pub fn clear(&mut self) {
        self.by_key.clear();
        self.next_install = 0;
    }
}
