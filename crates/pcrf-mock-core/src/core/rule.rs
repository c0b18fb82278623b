// crates/pcrf-mock-core/src/core/rule.rs
// ============================================================================
// Module: Policy Rules
// Description: Static policy rule model with QoS bounds.
// Purpose: Describe rules the provisioning collaborator installs and the mock references.
// Dependencies: serde, crate::core::{error, identifiers}
// ============================================================================

//! ## Overview
//! Policy rules are owned by the rule-provisioning collaborator. The mock only
//! refers to them by id in answers; the QoS bounds they carry become the
//! ceilings used for rate verification once an answer installs them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::error::ConfigurationError;
use crate::core::identifiers::MonitoringKey;
use crate::core::identifiers::RuleId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Traffic direction relative to the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Subscriber to network.
    Uplink,
    /// Network to subscriber.
    Downlink,
}

impl Direction {
    /// Returns a stable label for the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uplink => "uplink",
            Self::Downlink => "downlink",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which component tracks usage for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingType {
    /// Policy server only.
    #[default]
    OnlyPcrf,
    /// Online charging only.
    OnlyOcs,
    /// Both policy server and online charging.
    PcrfAndOcs,
    /// No tracking.
    NoTracking,
}

/// Per-flow bitrate bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlowQos {
    /// Maximum uplink bitrate in bits per second.
    #[serde(default)]
    pub max_uplink_bps: Option<u64>,
    /// Maximum downlink bitrate in bits per second.
    #[serde(default)]
    pub max_downlink_bps: Option<u64>,
}

impl FlowQos {
    /// Uplink-only bound.
    #[must_use]
    pub const fn uplink(bps: u64) -> Self {
        Self {
            max_uplink_bps: Some(bps),
            max_downlink_bps: None,
        }
    }

    /// Downlink-only bound.
    #[must_use]
    pub const fn downlink(bps: u64) -> Self {
        Self {
            max_uplink_bps: None,
            max_downlink_bps: Some(bps),
        }
    }

    /// Returns the bound for a direction.
    #[must_use]
    pub const fn bound(&self, direction: Direction) -> Option<u64> {
        match direction {
            Direction::Uplink => self.max_uplink_bps,
            Direction::Downlink => self.max_downlink_bps,
        }
    }
}

/// Static policy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Rule identifier.
    pub id: RuleId,
    /// Monitoring key the rule accounts under.
    pub monitoring_key: MonitoringKey,
    /// Rule priority (lower wins).
    pub priority: u32,
    /// Usage tracking type.
    #[serde(default)]
    pub tracking_type: TrackingType,
    /// QoS bounds.
    pub qos: Option<FlowQos>,
}

impl PolicyRule {
    /// Validates the rule for installation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidRule`] when the id or key is empty,
    /// QoS is missing, or a configured bound is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidRule {
            rule_id: self.id.to_string(),
            reason: reason.to_string(),
        };
        if self.id.as_str().trim().is_empty() {
            return Err(invalid("rule id must not be empty"));
        }
        if self.monitoring_key.as_str().trim().is_empty() {
            return Err(invalid("monitoring key must not be empty"));
        }
        let Some(qos) = self.qos else {
            return Err(invalid("qos is required"));
        };
        if qos.max_uplink_bps.is_none() && qos.max_downlink_bps.is_none() {
            return Err(invalid("qos must set max_uplink_bps or max_downlink_bps"));
        }
        if qos.max_uplink_bps == Some(0) || qos.max_downlink_bps == Some(0) {
            return Err(invalid("qos bounds must be greater than zero"));
        }
        Ok(())
    }
}
