// crates/pcrf-mock-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `pcrf-mock.toml` payload used by docs and tests.

/// Returns a canonical example `pcrf-mock.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[matching]
repeat_policy = "repeatable"
usage_comparison = "exact"

[verifier]
relative_tolerance = 0.05

[wait]
expectation_timeout_ms = 5000
measurement_timeout_ms = 30000
poll_interval_ms = 50

[audit]
sink = "stderr"
# sink = "file"
# path = "pcrf-mock-audit.jsonl"
"#,
    )
}
