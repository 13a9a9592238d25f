// crates/mesh-suites-cli/src/lib.rs
// ============================================================================
// Module: Mesh Suites CLI Library
// Description: Shared catalog and option mapping for the `mesh-suites` binary.
// Purpose: Expose the compiled-in suite groups outside the binary.
// Dependencies: crate::{catalog, options}
// ============================================================================

//! ## Overview
//! Library half of the CLI crate. The binary and the system tests both
//! build their registries from [`catalog`] and their runtime options from
//! [`options`], so the list of suites lives in exactly one place.

pub mod catalog;
pub mod options;

pub use catalog::CatalogEntry;
pub use catalog::INTERDOMAIN;
pub use catalog::SINGLE_CLUSTER;
pub use catalog::SuiteGroup;
pub use catalog::build_registry;
pub use options::dispatch_options;
pub use options::script_options;
