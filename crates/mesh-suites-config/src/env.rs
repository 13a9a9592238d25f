// crates/mesh-suites-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: Environment-backed overrides for the run configuration.
// Purpose: Centralize env parsing with strict UTF-8 and non-empty validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values override the configuration file. They are parsed with
//! strict UTF-8 enforcement; a variable that is set but empty, or that does
//! not parse, fails closed instead of being ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys read by the configuration loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshSuitesEnv {
    /// Config file path override.
    Config,
    /// Comma-separated filter patterns.
    Filter,
    /// Maximum number of suites running at once.
    Parallelism,
    /// Per-suite timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Report artifact directory; enables artifacts when set.
    ReportDir,
    /// Directory holding suite manifests.
    SuitesDir,
}

impl MeshSuitesEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 6] = [
        Self::Config,
        Self::Filter,
        Self::Parallelism,
        Self::TimeoutSeconds,
        Self::ReportDir,
        Self::SuitesDir,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "MESH_SUITES_CONFIG",
            Self::Filter => "MESH_SUITES_FILTER",
            Self::Parallelism => "MESH_SUITES_PARALLELISM",
            Self::TimeoutSeconds => "MESH_SUITES_TIMEOUT_SEC",
            Self::ReportDir => "MESH_SUITES_REPORT_DIR",
            Self::SuitesDir => "MESH_SUITES_SUITES_DIR",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides read from the process environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Config file path.
    pub config_path: Option<PathBuf>,
    /// Filter patterns, replacing `run.filter`.
    pub filter: Option<Vec<String>>,
    /// Replaces `run.parallelism`.
    pub parallelism: Option<usize>,
    /// Replaces `run.suite_timeout_secs`.
    pub timeout_secs: Option<u64>,
    /// Replaces `artifacts.root` and enables artifacts.
    pub report_dir: Option<String>,
    /// Replaces `scripts.suites_dir`.
    pub suites_dir: Option<String>,
}

impl EnvOverrides {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is empty, or does
    /// not parse.
    pub fn from_env() -> Result<Self, String> {
        let config_path = read_env_nonempty(MeshSuitesEnv::Config.as_str())?.map(PathBuf::from);
        let filter = read_env_nonempty(MeshSuitesEnv::Filter.as_str())?
            .map(|value| parse_filter(MeshSuitesEnv::Filter.as_str(), &value))
            .transpose()?;
        let parallelism = read_env_nonempty(MeshSuitesEnv::Parallelism.as_str())?
            .map(|value| parse_positive(MeshSuitesEnv::Parallelism.as_str(), &value))
            .transpose()?
            .map(|value| usize::try_from(value).unwrap_or(usize::MAX));
        let timeout_secs = read_env_nonempty(MeshSuitesEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_positive(MeshSuitesEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let report_dir = read_env_nonempty(MeshSuitesEnv::ReportDir.as_str())?;
        let suites_dir = read_env_nonempty(MeshSuitesEnv::SuitesDir.as_str())?;
        Ok(Self {
            config_path,
            filter,
            parallelism,
            timeout_secs,
            report_dir,
            suites_dir,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive integer.
pub(crate) fn parse_positive(name: &str, raw: &str) -> Result<u64, String> {
    let value: u64 =
        raw.trim().parse().map_err(|_| format!("{name} must be a positive integer"))?;
    if value == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(value)
}

/// Splits a comma-separated pattern list, rejecting empty entries.
pub(crate) fn parse_filter(name: &str, raw: &str) -> Result<Vec<String>, String> {
    raw.split(',')
        .map(|pattern| {
            let trimmed = pattern.trim();
            if trimmed.is_empty() {
                Err(format!("{name} contains an empty pattern"))
            } else {
                Ok(trimmed.to_string())
            }
        })
        .collect()
}
