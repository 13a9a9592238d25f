// crates/mesh-suites-script/src/manifest.rs
// ============================================================================
// Module: Suite Manifest
// Description: TOML model for a scripted suite and its validation.
// Purpose: Load deployment-supplied step lists with strict, bounded parsing.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! A manifest describes one suite: optional suite-level setup and cleanup
//! steps, and an ordered list of cases, each with its own steps and cleanup.
//! A step is either a bare command string or a table with retry and timeout
//! settings.
//!
//! ```toml
//! description = "Heal scenarios"
//! workdir = "heal"
//! env = { NAMESPACE = "ns-heal" }
//!
//! [setup]
//! steps = ["kubectl create ns $NAMESPACE"]
//! cleanup = ["kubectl delete ns $NAMESPACE"]
//!
//! [[cases]]
//! name = "TestRegistryRestart"
//! steps = [
//!     "kubectl apply -k .",
//!     { run = "kubectl wait --for=condition=ready pod -l app=nsc", timeout_secs = 120, retries = 3 },
//! ]
//! cleanup = ["kubectl delete -k ."]
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum manifest file size in bytes.
pub const MAX_MANIFEST_SIZE: usize = 256 * 1024;
/// Maximum number of cases per manifest.
pub const MAX_CASES: usize = 512;
/// Maximum number of steps in one step list.
pub const MAX_STEPS: usize = 256;
/// Maximum length of one step command.
pub const MAX_STEP_LENGTH: usize = 64 * 1024;
/// Maximum retries for one step.
pub const MAX_RETRIES: u32 = 100;
/// Maximum delay between retries in milliseconds.
pub const MAX_RETRY_INTERVAL_MS: u64 = 10 * 60 * 1000;
/// Maximum step timeout in seconds.
pub const MAX_STEP_TIMEOUT_SECS: u64 = 24 * 60 * 60;
/// Maximum length of a case name.
pub const MAX_CASE_NAME_LENGTH: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Manifest loading and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// I/O failure while reading the manifest.
    #[error("manifest io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("manifest parse error: {0}")]
    Parse(String),
    /// Structurally valid TOML with invalid content.
    #[error("invalid manifest: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// One shell step with its execution policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawStep")]
pub struct Step {
    /// Command passed to the shell.
    pub run: String,
    /// Per-step timeout; the runner default applies when unset.
    pub timeout_secs: Option<u64>,
    /// Additional attempts after the first failure.
    pub retries: u32,
    /// Delay between attempts in milliseconds.
    pub retry_interval_ms: u64,
}

impl Step {
    /// Builds a step with no retries and the default timeout.
    #[must_use]
    pub fn command(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            timeout_secs: None,
            retries: 0,
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }

    /// Returns the step timeout, if set.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Returns the delay between attempts.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Validates limits for one step.
    fn validate(&self, field: &str) -> Result<(), ManifestError> {
        if self.run.trim().is_empty() {
            return Err(ManifestError::Invalid(format!("{field} contains an empty step")));
        }
        if self.run.len() > MAX_STEP_LENGTH {
            return Err(ManifestError::Invalid(format!("{field} step exceeds max length")));
        }
        if self.run.contains('\0') {
            return Err(ManifestError::Invalid(format!("{field} step contains a NUL byte")));
        }
        if let Some(timeout) = self.timeout_secs
            && (timeout == 0 || timeout > MAX_STEP_TIMEOUT_SECS)
        {
            return Err(ManifestError::Invalid(format!(
                "{field} timeout_secs must be between 1 and {MAX_STEP_TIMEOUT_SECS}"
            )));
        }
        if self.retries > MAX_RETRIES {
            return Err(ManifestError::Invalid(format!(
                "{field} retries must be at most {MAX_RETRIES}"
            )));
        }
        if self.retry_interval_ms > MAX_RETRY_INTERVAL_MS {
            return Err(ManifestError::Invalid(format!(
                "{field} retry_interval_ms must be at most {MAX_RETRY_INTERVAL_MS}"
            )));
        }
        Ok(())
    }
}

/// Default delay between attempts.
const DEFAULT_RETRY_INTERVAL_MS: u64 = 1_000;

/// Wire form of a step: a bare string or a table.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStep {
    /// Bare command.
    Command(String),
    /// Command with execution policy.
    Detailed(StepTable),
}

/// Table form of a step.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StepTable {
    /// Command passed to the shell.
    run: String,
    /// Optional timeout in seconds.
    #[serde(default)]
    timeout_secs: Option<u64>,
    /// Additional attempts.
    #[serde(default)]
    retries: u32,
    /// Delay between attempts.
    #[serde(default)]
    retry_interval_ms: Option<u64>,
}

impl From<RawStep> for Step {
    fn from(raw: RawStep) -> Self {
        match raw {
            RawStep::Command(run) => Self::command(run),
            RawStep::Detailed(table) => Self {
                run: table.run,
                timeout_secs: table.timeout_secs,
                retries: table.retries,
                retry_interval_ms: table.retry_interval_ms.unwrap_or(DEFAULT_RETRY_INTERVAL_MS),
            },
        }
    }
}

// ============================================================================
// SECTION: Manifest
// ============================================================================

/// Suite-level setup and cleanup steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupSection {
    /// Steps run once before any case.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Steps run once after every case, even when setup failed.
    #[serde(default)]
    pub cleanup: Vec<Step>,
}

/// One case of a scripted suite.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseManifest {
    /// Case name reported by the harness.
    pub name: String,
    /// Working directory relative to the workdir root; inherits the suite's.
    #[serde(default)]
    pub workdir: Option<String>,
    /// Extra environment merged over the suite environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Steps run in order; the first failure ends the case.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Steps run after the case, even when it failed.
    #[serde(default)]
    pub cleanup: Vec<Step>,
}

/// Scripted suite manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteManifest {
    /// Free-form description logged at suite start.
    #[serde(default)]
    pub description: Option<String>,
    /// Working directory relative to the workdir root.
    #[serde(default)]
    pub workdir: Option<String>,
    /// Environment applied to every step.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Suite-level setup and cleanup.
    #[serde(default)]
    pub setup: SetupSection,
    /// Cases in execution order.
    #[serde(default)]
    pub cases: Vec<CaseManifest>,
}

impl SuiteManifest {
    /// Loads and validates a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path)
            .map_err(|err| ManifestError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_MANIFEST_SIZE {
            return Err(ManifestError::Invalid(format!(
                "{} exceeds size limit",
                path.display()
            )));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ManifestError::Invalid(format!("{} must be utf-8", path.display())))?;
        Self::parse(content)
    }

    /// Parses and validates manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        if content.len() > MAX_MANIFEST_SIZE {
            return Err(ManifestError::Invalid("manifest exceeds size limit".to_string()));
        }
        let manifest: Self =
            toml::from_str(content).map_err(|err| ManifestError::Parse(err.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validates names, steps, and limits.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] on the first violation.
    pub fn validate(&self) -> Result<(), ManifestError> {
        validate_workdir("workdir", self.workdir.as_deref())?;
        validate_env("env", &self.env)?;
        validate_steps("setup.steps", &self.setup.steps)?;
        validate_steps("setup.cleanup", &self.setup.cleanup)?;
        if self.cases.len() > MAX_CASES {
            return Err(ManifestError::Invalid(format!("manifest exceeds {MAX_CASES} cases")));
        }
        let mut seen = BTreeSet::new();
        for case in &self.cases {
            let name = case.name.trim();
            if name.is_empty() {
                return Err(ManifestError::Invalid("case name must be non-empty".to_string()));
            }
            if name.len() > MAX_CASE_NAME_LENGTH || name.contains('/') {
                return Err(ManifestError::Invalid(format!("case name {name} is not allowed")));
            }
            if !seen.insert(name) {
                return Err(ManifestError::Invalid(format!("duplicate case name {name}")));
            }
            let field = format!("cases.{name}");
            validate_workdir(&format!("{field}.workdir"), case.workdir.as_deref())?;
            validate_env(&format!("{field}.env"), &case.env)?;
            validate_steps(&format!("{field}.steps"), &case.steps)?;
            validate_steps(&format!("{field}.cleanup"), &case.cleanup)?;
        }
        Ok(())
    }

    /// Returns case names in execution order.
    #[must_use]
    pub fn case_names(&self) -> Vec<&str> {
        self.cases.iter().map(|case| case.name.as_str()).collect()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a step list.
fn validate_steps(field: &str, steps: &[Step]) -> Result<(), ManifestError> {
    if steps.len() > MAX_STEPS {
        return Err(ManifestError::Invalid(format!("{field} exceeds {MAX_STEPS} steps")));
    }
    steps.iter().try_for_each(|step| step.validate(field))
}

/// Validates an optional relative working directory.
fn validate_workdir(field: &str, workdir: Option<&str>) -> Result<(), ManifestError> {
    let Some(workdir) = workdir else {
        return Ok(());
    };
    if workdir.trim().is_empty() {
        return Err(ManifestError::Invalid(format!("{field} must be non-empty")));
    }
    if Path::new(workdir).has_root() {
        return Err(ManifestError::Invalid(format!("{field} must be relative")));
    }
    Ok(())
}

/// Validates environment variable names and values.
fn validate_env(field: &str, env: &BTreeMap<String, String>) -> Result<(), ManifestError> {
    for (key, value) in env {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ManifestError::Invalid(format!("{field} has invalid key `{key}`")));
        }
        if value.contains('\0') {
            return Err(ManifestError::Invalid(format!("{field}.{key} contains a NUL byte")));
        }
    }
    Ok(())
}
