// crates/pcrf-mock-core/src/core/message.rs
// ============================================================================
// Module: Credit-Control Message Model
// Description: Typed credit-control requests, answers, and answer envelopes.
// Purpose: Give the mock engine a serde-stable wire model for the request/answer pair.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A credit-control request identifies a subject, a request kind, and a
//! sequence number, and may carry usage reports. An answer carries a result
//! code, rule-install and rule-removal sets, and usage-monitor directives.
//!
//! Rule sets are always serialized, including when empty, so consumers can
//! tell "explicitly no rules" apart from an omitted field.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::MonitoringKey;
use crate::core::identifiers::RuleId;
use crate::core::identifiers::SubjectId;

// ============================================================================
// SECTION: Request Model
// ============================================================================

/// Credit-control request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    /// Session establishment.
    Initial,
    /// Mid-session usage update.
    Update,
    /// Session termination.
    Termination,
}

impl RequestKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::Update => "UPDATE",
            Self::Termination => "TERMINATION",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound credit-control request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditControlRequest {
    /// Subject the session belongs to.
    pub subject_id: SubjectId,
    /// Request kind.
    pub kind: RequestKind,
    /// Per-session request sequence number.
    pub sequence_number: u32,
    /// Bytes used per monitoring key since the last report.
    #[serde(default)]
    pub monitoring_reports: BTreeMap<MonitoringKey, u64>,
    /// Optional reported usage delta.
    #[serde(default)]
    pub reported_delta: Option<u64>,
}

impl CreditControlRequest {
    /// Creates a request without usage reports.
    #[must_use]
    pub fn new(subject_id: impl Into<SubjectId>, kind: RequestKind, sequence_number: u32) -> Self {
        Self {
            subject_id: subject_id.into(),
            kind,
            sequence_number,
            monitoring_reports: BTreeMap::new(),
            reported_delta: None,
        }
    }

    /// Adds a usage report for a monitoring key.
    #[must_use]
    pub fn with_usage_report(mut self, key: impl Into<MonitoringKey>, bytes_used: u64) -> Self {
        self.monitoring_reports.insert(key.into(), bytes_used);
        self
    }

    /// Sets the reported usage delta.
    #[must_use]
    pub const fn with_reported_delta(mut self, delta: u64) -> Self {
        self.reported_delta = Some(delta);
        self
    }
}

// ============================================================================
// SECTION: Answer Model
// ============================================================================

/// Credit-control result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(u32);

impl ResultCode {
    /// Request processed successfully.
    pub const SUCCESS: Self = Self(2001);
    /// Subscriber not authorized for the requested service.
    pub const AUTHORIZATION_REJECTED: Self = Self(5003);
    /// Request could not be processed.
    pub const UNABLE_TO_COMPLY: Self = Self(5012);
    /// Subscriber identity unknown.
    pub const USER_UNKNOWN: Self = Self(5030);

    /// Creates a result code from its raw value.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true for 2xxx success codes.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 2000 && self.0 < 3000
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Scope a usage monitor applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringLevel {
    /// Usage counted across the whole session.
    SessionLevel,
    /// Usage counted per rule sharing the key.
    #[default]
    RuleLevel,
}

/// Usage quota granted for one monitoring key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageQuota {
    /// Granted total bytes before the gateway must report again.
    pub total_bytes: u64,
    /// Monitoring scope.
    #[serde(default)]
    pub level: MonitoringLevel,
}

impl UsageQuota {
    /// Creates a rule-level quota.
    #[must_use]
    pub const fn rule_level(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            level: MonitoringLevel::RuleLevel,
        }
    }
}

/// Credit-control answer payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditControlAnswer {
    /// Result code for the exchange.
    pub result_code: ResultCode,
    /// Static rules to install.
    pub rule_installs: BTreeSet<RuleId>,
    /// Static rules to remove.
    pub rule_removals: BTreeSet<RuleId>,
    /// Usage-monitor quota per monitoring key.
    pub monitor_directives: BTreeMap<MonitoringKey, UsageQuota>,
}

impl CreditControlAnswer {
    /// Creates an answer with the given result code and no directives.
    #[must_use]
    pub const fn new(result_code: ResultCode) -> Self {
        Self {
            result_code,
            rule_installs: BTreeSet::new(),
            rule_removals: BTreeSet::new(),
            monitor_directives: BTreeMap::new(),
        }
    }

    /// Creates a `SUCCESS` answer with no directives.
    #[must_use]
    pub const fn success() -> Self {
        Self::new(ResultCode::SUCCESS)
    }

    /// Sets the static rule installs and removals.
    #[must_use]
    pub fn with_static_rules<I, R>(mut self, installs: I, removals: R) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RuleId>,
        R: IntoIterator,
        R::Item: Into<RuleId>,
    {
        self.rule_installs = installs.into_iter().map(Into::into).collect();
        self.rule_removals = removals.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a usage-monitor directive.
    #[must_use]
    pub fn with_usage_monitor(mut self, key: impl Into<MonitoringKey>, quota: UsageQuota) -> Self {
        self.monitor_directives.insert(key.into(), quota);
        self
    }
}

/// Answer envelope echoing the identity of the request it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMessage {
    /// Subject from the request.
    pub subject_id: SubjectId,
    /// Request kind from the request.
    pub kind: RequestKind,
    /// Sequence number from the request.
    pub sequence_number: u32,
    /// Answer payload.
    pub answer: CreditControlAnswer,
}

impl AnswerMessage {
    /// Wraps an answer for the given request.
    #[must_use]
    pub fn for_request(request: &CreditControlRequest, answer: CreditControlAnswer) -> Self {
        Self {
            subject_id: request.subject_id.clone(),
            kind: request.kind,
            sequence_number: request.sequence_number,
            answer,
        }
    }
}
