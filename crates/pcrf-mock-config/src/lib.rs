// crates/pcrf-mock-config/src/lib.rs
// ============================================================================
// Module: PCRF Mock Config Library
// Description: Configuration model, validation, and canonical example.
// Purpose: Single source of truth for pcrf-mock.toml semantics.
// Dependencies: pcrf-mock-core, serde, toml
// ============================================================================

//! ## Overview
//! `pcrf-mock-config` loads and validates `pcrf-mock.toml`, then converts it
//! into the engine configuration, wait policy, and audit sink used by the
//! scenario harness. Invalid input fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
