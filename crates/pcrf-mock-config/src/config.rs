// crates/pcrf-mock-config/src/config.rs
// ============================================================================
// Module: PCRF Mock Configuration
// Description: Configuration loading and validation for the PCRF mock.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: pcrf-mock-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Path resolution prefers an explicit path, then `PCRF_MOCK_CONFIG`, then
//! `pcrf-mock.toml` in the working directory. Every section is optional and
//! unknown keys are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pcrf_mock_core::MatchPolicy;
use pcrf_mock_core::MockAuditSink;
use pcrf_mock_core::MockEngineConfig;
use pcrf_mock_core::RepeatPolicy;
use pcrf_mock_core::UsageComparison;
use pcrf_mock_core::runtime::FileAuditSink;
use pcrf_mock_core::runtime::NoopAuditSink;
use pcrf_mock_core::runtime::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "pcrf-mock.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PCRF_MOCK_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default relative tolerance for rate verification.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.05;
/// Largest accepted relative tolerance.
pub const MAX_RELATIVE_TOLERANCE: f64 = 10.0;
/// Default expectation settlement timeout in milliseconds.
const DEFAULT_EXPECTATION_TIMEOUT_MS: u64 = 5_000;
/// Default traffic measurement timeout in milliseconds.
const DEFAULT_MEASUREMENT_TIMEOUT_MS: u64 = 30_000;
/// Default poll interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
/// Minimum wait timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 10;
/// Maximum wait timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 600_000;
/// Minimum poll interval in milliseconds.
pub const MIN_POLL_INTERVAL_MS: u64 = 1;
/// Maximum poll interval in milliseconds.
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// PCRF mock configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PcrfMockConfig {
    /// Expectation matching behavior.
    #[serde(default)]
    pub matching: MatchingConfig,
    /// Rate verifier defaults.
    #[serde(default)]
    pub verifier: VerifierConfig,
    /// Bounded wait settings.
    #[serde(default)]
    pub wait: WaitConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// `[matching]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Whether matched expectations stay eligible.
    #[serde(default)]
    pub repeat_policy: RepeatPolicy,
    /// Secondary usage field comparison.
    #[serde(default)]
    pub usage_comparison: UsageComparison,
}

/// `[verifier]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Allowed fractional deviation from the QoS ceiling.
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}

/// `[wait]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitConfig {
    /// Upper bound on waiting for expectation results to settle.
    #[serde(default = "default_expectation_timeout_ms")]
    pub expectation_timeout_ms: u64,
    /// Upper bound on one traffic measurement.
    #[serde(default = "default_measurement_timeout_ms")]
    pub measurement_timeout_ms: u64,
    /// Delay between polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            expectation_timeout_ms: DEFAULT_EXPECTATION_TIMEOUT_MS,
            measurement_timeout_ms: DEFAULT_MEASUREMENT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// Append-only JSON lines file.
    File,
}

/// `[audit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log path, required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

/// Bounded wait durations used by the scenario harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Upper bound on waiting for expectation results to settle.
    pub expectation_timeout: Duration,
    /// Upper bound on one traffic measurement.
    pub measurement_timeout: Duration,
    /// Delay between polls.
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitConfig::default().policy()
    }
}

impl WaitConfig {
    /// Converts millisecond settings into durations.
    #[must_use]
    pub const fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            expectation_timeout: Duration::from_millis(self.expectation_timeout_ms),
            measurement_timeout: Duration::from_millis(self.measurement_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// Validates bounds and the poll/timeout ordering.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("wait.expectation_timeout_ms", self.expectation_timeout_ms),
            ("wait.measurement_timeout_ms", self.measurement_timeout_ms),
        ] {
            if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{field} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
                )));
            }
            if self.poll_interval_ms >= value {
                return Err(ConfigError::Invalid(format!(
                    "wait.poll_interval_ms must be less than {field}"
                )));
            }
        }
        if !(MIN_POLL_INTERVAL_MS ..= MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "wait.poll_interval_ms must be between {MIN_POLL_INTERVAL_MS} and \
                 {MAX_POLL_INTERVAL_MS}"
            )));
        }
        Ok(())
    }
}

impl VerifierConfig {
    /// Validates the tolerance range.
    fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.relative_tolerance;
        if !tolerance.is_finite() || !(0.0 ..= MAX_RELATIVE_TOLERANCE).contains(&tolerance) {
            return Err(ConfigError::Invalid(format!(
                "verifier.relative_tolerance must be between 0 and {MAX_RELATIVE_TOLERANCE}"
            )));
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Validates sink and path consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid for the file sink".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Loading and Conversion
// ============================================================================

impl PcrfMockConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env::var(CONFIG_ENV_VAR).ok())?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any section is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verifier.validate()?;
        self.wait.validate()?;
        self.audit.validate()
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn engine_config(&self) -> MockEngineConfig {
        MockEngineConfig {
            match_policy: MatchPolicy {
                repeat: self.matching.repeat_policy,
                usage: self.matching.usage_comparison,
            },
        }
    }

    /// Returns the bounded wait policy.
    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        self.wait.policy()
    }

    /// Returns the relative tolerance for rate verification.
    #[must_use]
    pub const fn relative_tolerance(&self) -> f64 {
        self.verifier.relative_tolerance
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn MockAuditSink>, ConfigError> {
        match (self.audit.sink, self.audit.path.as_deref()) {
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening sinks.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default tolerance for serde.
const fn default_relative_tolerance() -> f64 {
    DEFAULT_RELATIVE_TOLERANCE
}

/// Default expectation timeout for serde.
const fn default_expectation_timeout_ms() -> u64 {
    DEFAULT_EXPECTATION_TIMEOUT_MS
}

/// Default measurement timeout for serde.
const fn default_measurement_timeout_ms() -> u64 {
    DEFAULT_MEASUREMENT_TIMEOUT_MS
}

/// Default poll interval for serde.
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Resolves the config path from an explicit path or environment override.
fn resolve_path(path: Option<&Path>, env_path: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    #[test]
    fn explicit_path_wins_over_env() {
        let resolved =
            resolve_path(Some(Path::new("explicit.toml")), Some("env.toml".to_string())).unwrap();
        assert_eq!(resolved, PathBuf::from("explicit.toml"));
    }

    #[test]
    fn env_path_wins_over_default() {
        let resolved = resolve_path(None, Some("env.toml".to_string())).unwrap();
        assert_eq!(resolved, PathBuf::from("env.toml"));
    }

    #[test]
    fn default_name_when_unset() {
        assert_eq!(resolve_path(None, None).unwrap(), PathBuf::from(DEFAULT_CONFIG_NAME));
    }

    #[test]
    fn overlong_env_path_is_rejected() {
        let result = resolve_path(None, Some("a".repeat(MAX_TOTAL_PATH_LENGTH + 1)));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_path_string_rejects_empty_string() {
        assert!(validate_path_string("audit.path", "  ").is_err());
        assert!(validate_path_string("audit.path", "./logs/audit.jsonl").is_ok());
    }
}
