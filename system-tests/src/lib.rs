// system-tests/src/lib.rs
// ============================================================================
// Module: Mesh Suites System Tests Library
// Description: Shared configuration for system test entry points.
// Purpose: Provide common settings for the system-test binaries.
// Dependencies: mesh-suites-config
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the system-test binaries in
//! `system-tests/tests`. Suite selection and dispatch settings come from the
//! regular `mesh-suites.toml` and `MESH_SUITES_*` variables; this crate only
//! adds where per-test artifacts are written.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
