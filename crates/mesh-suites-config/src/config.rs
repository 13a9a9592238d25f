// crates/mesh-suites-config/src/config.rs
// ============================================================================
// Module: Mesh Suites Configuration
// Description: Configuration loading and validation for suite runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is read from `mesh-suites.toml`. The path comes from an
//! explicit argument, then `MESH_SUITES_CONFIG`, then the default file name.
//! Only the default file may be absent, in which case built-in defaults
//! apply. Environment overrides are applied after parsing and before
//! validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::env::EnvOverrides;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "mesh-suites.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of suites running at once.
pub const MAX_PARALLELISM: usize = 64;
/// Maximum per-suite or per-step timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;
/// Maximum number of filter patterns.
pub(crate) const MAX_FILTER_PATTERNS: usize = 64;
/// Maximum length of one filter pattern.
pub(crate) const MAX_FILTER_PATTERN_LENGTH: usize = 256;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Invalid environment override.
    #[error("invalid environment: {0}")]
    Env(String),
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Top-level configuration for a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MeshSuitesConfig {
    /// Dispatch settings.
    #[serde(default)]
    pub run: RunConfig,
    /// Report artifact settings.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Run event sink settings.
    #[serde(default)]
    pub events: EventsConfig,
    /// Scripted suite settings.
    #[serde(default)]
    pub scripts: ScriptsConfig,
    /// File the configuration was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl MeshSuitesConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override, the file, or validation
    /// fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let overrides = EnvOverrides::from_env().map_err(ConfigError::Env)?;
        Self::load_with(path, &overrides)
    }

    /// Loads configuration with explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file or validation fails.
    pub fn load_with(path: Option<&Path>, overrides: &EnvOverrides) -> Result<Self, ConfigError> {
        let (resolved, required) = resolve_path(path, overrides);
        validate_path(&resolved)?;
        let mut config = if !required && !resolved.exists() {
            Self::default()
        } else {
            let mut config = Self::from_file(&resolved)?;
            config.source = Some(resolved);
            config
        };
        config.apply_env(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration file without applying overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides on top of file values.
    pub fn apply_env(&mut self, overrides: &EnvOverrides) {
        if let Some(filter) = &overrides.filter {
            self.run.filter.clone_from(filter);
        }
        if let Some(parallelism) = overrides.parallelism {
            self.run.parallelism = parallelism;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.run.suite_timeout_secs = Some(timeout);
        }
        if let Some(root) = &overrides.report_dir {
            self.artifacts.root.clone_from(root);
            self.artifacts.enabled = true;
        }
        if let Some(dir) = &overrides.suites_dir {
            self.scripts.suites_dir.clone_from(dir);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.run.validate()?;
        self.artifacts.validate()?;
        self.events.validate()?;
        self.scripts.validate()
    }
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Suite or `suite/case` patterns; empty selects everything.
    #[serde(default)]
    pub filter: Vec<String>,
    /// Match patterns exactly instead of by substring.
    #[serde(default)]
    pub exact: bool,
    /// Maximum number of suites running at once.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Optional wall-clock limit per suite, in seconds.
    #[serde(default)]
    pub suite_timeout_secs: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            filter: Vec::new(),
            exact: false,
            parallelism: default_parallelism(),
            suite_timeout_secs: None,
        }
    }
}

impl RunConfig {
    /// Returns the validated parallelism.
    #[must_use]
    pub fn parallelism(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.parallelism).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the per-suite timeout, if configured.
    #[must_use]
    pub fn suite_timeout(&self) -> Option<Duration> {
        self.suite_timeout_secs.map(Duration::from_secs)
    }

    /// Validates dispatch settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 || self.parallelism > MAX_PARALLELISM {
            return Err(ConfigError::Invalid(format!(
                "run.parallelism must be between 1 and {MAX_PARALLELISM}"
            )));
        }
        if let Some(timeout) = self.suite_timeout_secs {
            validate_timeout("run.suite_timeout_secs", timeout)?;
        }
        if self.filter.len() > MAX_FILTER_PATTERNS {
            return Err(ConfigError::Invalid(format!(
                "run.filter exceeds {MAX_FILTER_PATTERNS} patterns"
            )));
        }
        for pattern in &self.filter {
            if pattern.trim().is_empty() {
                return Err(ConfigError::Invalid("run.filter patterns must be non-empty".to_string()));
            }
            if pattern.len() > MAX_FILTER_PATTERN_LENGTH {
                return Err(ConfigError::Invalid("run.filter pattern exceeds max length".to_string()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Report artifact settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactsConfig {
    /// Write report artifacts after a run.
    #[serde(default)]
    pub enabled: bool,
    /// Directory receiving `report.json`, `report.md`, and `suites/`.
    #[serde(default = "default_artifacts_root")]
    pub root: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            root: default_artifacts_root(),
        }
    }
}

impl ArtifactsConfig {
    /// Validates artifact settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("artifacts.root", &self.root)
    }
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Run event destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `events.path`.
    File,
    /// Events are discarded.
    None,
}

/// Run event sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: EventSinkKind,
    /// Output path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl EventsConfig {
    /// Validates event settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (EventSinkKind::File, None) => Err(ConfigError::Invalid(
                "events.path is required when events.sink = \"file\"".to_string(),
            )),
            (EventSinkKind::File, Some(path)) => validate_path_string("events.path", path),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "events.path is only valid when events.sink = \"file\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Scripts
// ============================================================================

/// Scripted suite settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptsConfig {
    /// Directory holding `<suite>.toml` manifests.
    #[serde(default = "default_suites_dir")]
    pub suites_dir: String,
    /// Shell used to run steps as `<shell> -c <step>`.
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Base directory for manifest `workdir` values; defaults to `suites_dir`.
    #[serde(default)]
    pub workdir_root: Option<String>,
    /// Step timeout applied when a step does not set its own.
    #[serde(default = "default_step_timeout_secs")]
    pub default_step_timeout_secs: u64,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            suites_dir: default_suites_dir(),
            shell: default_shell(),
            workdir_root: None,
            default_step_timeout_secs: default_step_timeout_secs(),
        }
    }
}

impl ScriptsConfig {
    /// Returns the directory manifest workdirs are resolved against.
    #[must_use]
    pub fn workdir_root(&self) -> &str {
        self.workdir_root.as_deref().unwrap_or(&self.suites_dir)
    }

    /// Returns the default step timeout.
    #[must_use]
    pub const fn default_step_timeout(&self) -> Duration {
        Duration::from_secs(self.default_step_timeout_secs)
    }

    /// Validates script settings.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("scripts.suites_dir", &self.suites_dir)?;
        if let Some(root) = &self.workdir_root {
            validate_path_string("scripts.workdir_root", root)?;
        }
        if self.shell.trim().is_empty() {
            return Err(ConfigError::Invalid("scripts.shell must be non-empty".to_string()));
        }
        validate_timeout("scripts.default_step_timeout_secs", self.default_step_timeout_secs)
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default suite parallelism.
const fn default_parallelism() -> usize {
    1
}

/// Default artifact directory.
fn default_artifacts_root() -> String {
    "target/mesh-suites".to_string()
}

/// Default manifest directory.
fn default_suites_dir() -> String {
    "suites".to_string()
}

/// Default step shell.
fn default_shell() -> String {
    "sh".to_string()
}

/// Default step timeout in seconds.
const fn default_step_timeout_secs() -> u64 {
    600
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag is true when the file must exist.
fn resolve_path(path: Option<&Path>, overrides: &EnvOverrides) -> (PathBuf, bool) {
    if let Some(path) = path {
        return (path.to_path_buf(), true);
    }
    if let Some(path) = &overrides.config_path {
        return (path.clone(), true);
    }
    (PathBuf::from(DEFAULT_CONFIG_NAME), false)
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a timeout in seconds.
fn validate_timeout(field: &str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::Invalid(format!("{field} must be at most {MAX_TIMEOUT_SECS}")));
    }
    Ok(())
}
