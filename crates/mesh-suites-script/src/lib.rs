// crates/mesh-suites-script/src/lib.rs
// ============================================================================
// Module: Mesh Suites Script Library
// Description: Scripted suites backed by TOML manifests of shell steps.
// Purpose: Expose the manifest model, step runner, and suite implementation.
// Dependencies: mesh-suites-core, serde, tempfile, thiserror, toml
// ============================================================================

//! ## Overview
//! Suite names are compiled in; what each suite does is supplied by the
//! deployment as `<suites_dir>/<name>.toml`. [`ScriptSuite`] loads that
//! manifest and runs its steps through [`ShellRunner`] under the shared
//! harness, so scripted suites report exactly like hand-written ones.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod manifest;
pub mod runner;
pub mod suite;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use manifest::CaseManifest;
pub use manifest::ManifestError;
pub use manifest::SetupSection;
pub use manifest::Step;
pub use manifest::SuiteManifest;
pub use runner::ScriptError;
pub use runner::ShellRunner;
pub use runner::StepOutput;
pub use runner::StepScope;
pub use runner::StepStatus;
pub use suite::ScriptOptions;
pub use suite::ScriptSuite;
