// crates/mesh-suites-config/src/lib.rs
// ============================================================================
// Module: Mesh Suites Config Library
// Description: Configuration model and loader for suite runs.
// Purpose: Expose typed run settings with environment overrides.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Run settings (dispatch, artifacts, events, scripted suites) are read from
//! a TOML file, overridden by `MESH_SUITES_*` environment variables, and
//! validated before use. Invalid input fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use config::ArtifactsConfig;
pub use config::ConfigError;
pub use config::DEFAULT_CONFIG_NAME;
pub use config::EventSinkKind;
pub use config::EventsConfig;
pub use config::MeshSuitesConfig;
pub use config::RunConfig;
pub use config::ScriptsConfig;
pub use env::EnvOverrides;
pub use env::MeshSuitesEnv;
pub use env::read_env_strict;
