// crates/pcrf-mock-harness/src/lib.rs
// ============================================================================
// Module: PCRF Mock Harness Library
// Description: Async scenario harness around the PCRF mock engine.
// Purpose: Drive credit-control scenarios and verify enforced QoS end to end.
// Dependencies: pcrf-mock-core, pcrf-mock-config, tokio
// ============================================================================

//! ## Overview
//! The harness owns what a scenario needs besides the engine itself: a
//! responder task that answers inbound requests, the ledger of QoS ceilings
//! in force, bounded waits instead of fixed sleeps, and a guard that clears
//! the mock when a scenario ends or is abandoned.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod enforcement;
pub mod error;
pub mod policy;
pub mod responder;
pub mod wait;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use context::Collaborators;
pub use context::HarnessSettings;
pub use context::ScenarioContext;
pub use context::ScenarioGuard;
pub use enforcement::RateBounds;
pub use enforcement::verify_measured_rate;
pub use error::HarnessError;
pub use policy::SharedPolicy;
pub use responder::Responder;
pub use responder::ResponderClient;
pub use wait::await_measurement;
pub use wait::wait_for_expectations;
pub use wait::wait_for_round_trips;
