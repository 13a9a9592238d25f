// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for mesh-suites system-tests.
// Purpose: Provide dispatch harnesses, fixtures, and artifact utilities.
// Dependencies: system-tests, mesh-suites-cli, mesh-suites-core
// ============================================================================

//! ## Overview
//! Shared helpers for mesh-suites system-tests.
//! Purpose: Provide dispatch harnesses, fixtures, and artifact utilities.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
