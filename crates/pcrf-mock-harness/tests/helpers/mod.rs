// crates/pcrf-mock-harness/tests/helpers/mod.rs
// ============================================================================
// Module: Harness Test Helpers
// Description: In-process collaborators and fixtures for scenario tests.
// Purpose: Drive the responder with real requests without a live gateway.
// Dependencies: pcrf-mock-core, pcrf-mock-harness
// ============================================================================

//! ## Overview
//! The simulated gateway stands in for the policy enforcement point: attach
//! and detach send credit-control requests through the responder, and
//! traffic is shaped by whatever QoS ceiling the answers put in force.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod audit;
pub mod fixture;
pub mod gateway;
pub mod rules;
