// crates/mesh-suites-script/src/suite.rs
// ============================================================================
// Module: Scripted Suite
// Description: Suite implementation driven by a TOML manifest of shell steps.
// Purpose: Give compiled-in suite names runnable content supplied at deploy time.
// Dependencies: mesh-suites-core, crate::{manifest, runner}
// ============================================================================

//! ## Overview
//! A [`ScriptSuite`] knows only its name and where its manifest lives. The
//! manifest is loaded by the `load` hook, before any setup step, so a
//! missing or invalid manifest fails that suite alone and a case filter
//! matching none of its cases leaves the environment untouched. Cleanup steps are registered before the steps
//! they undo run, so they execute even when a step fails or panics.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use mesh_suites_core::CaseError;
use mesh_suites_core::CaseResult;
use mesh_suites_core::Suite;
use mesh_suites_core::TestCase;
use mesh_suites_core::TestContext;

use crate::manifest::SuiteManifest;
use crate::runner::ShellRunner;
use crate::runner::StepScope;
use crate::runner::resolve_workdir;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Default step timeout for scripted suites.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(600);

/// Locations and shell settings shared by scripted suites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Directory holding `<suite>.toml` manifests.
    pub suites_dir: PathBuf,
    /// Base directory for manifest `workdir` values.
    pub workdir_root: PathBuf,
    /// Shell program for steps.
    pub shell: String,
    /// Timeout for steps that do not set one.
    pub default_step_timeout: Duration,
}

impl ScriptOptions {
    /// Creates options reading manifests from `suites_dir`, which is also the
    /// workdir root.
    #[must_use]
    pub fn new(suites_dir: impl Into<PathBuf>) -> Self {
        let suites_dir = suites_dir.into();
        Self {
            workdir_root: suites_dir.clone(),
            suites_dir,
            shell: "sh".to_string(),
            default_step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Overrides the workdir root.
    #[must_use]
    pub fn with_workdir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workdir_root = root.into();
        self
    }

    /// Overrides the shell program.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Overrides the default step timeout.
    #[must_use]
    pub const fn with_default_step_timeout(mut self, timeout: Duration) -> Self {
        self.default_step_timeout = timeout;
        self
    }

    /// Returns the manifest path for a suite name.
    #[must_use]
    pub fn manifest_path(&self, suite: &str) -> PathBuf {
        self.suites_dir.join(format!("{suite}.toml"))
    }

    /// Builds the runner described by these options.
    #[must_use]
    pub fn runner(&self) -> ShellRunner {
        ShellRunner::new(self.shell.clone(), self.default_step_timeout)
    }
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Suite whose cases are shell steps from a manifest.
pub struct ScriptSuite {
    /// Manifest file read during `setup_suite`.
    manifest_path: PathBuf,
    /// Base directory for workdirs.
    workdir_root: PathBuf,
    /// Step runner.
    runner: ShellRunner,
    /// Manifest, once loaded.
    manifest: Option<SuiteManifest>,
    /// Scope shared by suite-level steps, once loaded.
    scope: Option<StepScope>,
}

impl ScriptSuite {
    /// Creates a suite that will read `<suites_dir>/<name>.toml`.
    #[must_use]
    pub fn new(name: &str, options: &ScriptOptions) -> Self {
        Self::with_manifest_path(options.manifest_path(name), options)
    }

    /// Creates a suite reading an explicit manifest path.
    #[must_use]
    pub fn with_manifest_path(path: impl Into<PathBuf>, options: &ScriptOptions) -> Self {
        Self {
            manifest_path: path.into(),
            workdir_root: options.workdir_root.clone(),
            runner: options.runner(),
            manifest: None,
            scope: None,
        }
    }

    /// Creates a suite from an already parsed manifest.
    #[must_use]
    pub fn from_manifest(manifest: SuiteManifest, options: &ScriptOptions) -> Self {
        let mut suite = Self::with_manifest_path(PathBuf::new(), options);
        suite.manifest = Some(manifest);
        suite
    }

    /// Returns the manifest path.
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Loads the manifest unless one was supplied up front.
    fn ensure_manifest(&mut self) -> Result<&SuiteManifest, CaseError> {
        if self.manifest.is_none() {
            let manifest = SuiteManifest::load(&self.manifest_path)
                .map_err(|err| CaseError::failed(err.to_string()))?;
            self.manifest = Some(manifest);
        }
        self.manifest.as_ref().ok_or_else(|| CaseError::failed("manifest unavailable"))
    }

    /// Runs the case at `index` of the loaded manifest.
    fn run_case(&self, index: usize, ctx: &mut TestContext) -> CaseResult {
        let (Some(manifest), Some(suite_scope)) = (&self.manifest, &self.scope) else {
            return Err(ctx.fail_now("manifest not loaded"));
        };
        let Some(case) = manifest.cases.get(index) else {
            return Err(ctx.fail_now(format!("case {index} missing from manifest")));
        };
        let mut env: BTreeMap<String, String> = suite_scope.env.clone();
        env.extend(case.env.iter().map(|(key, value)| (key.clone(), value.clone())));
        let scope = StepScope {
            workdir: case.workdir.as_deref().map_or_else(
                || suite_scope.workdir.clone(),
                |dir| resolve_workdir(&self.workdir_root, Some(dir)),
            ),
            env,
        };
        if !case.cleanup.is_empty() {
            let runner = self.runner.clone();
            let steps = case.cleanup.clone();
            let cleanup_scope = scope.clone();
            ctx.cleanup(move |ctx| runner.run_cleanup_steps(&steps, &cleanup_scope, ctx));
        }
        self.runner.run_steps(&case.steps, &scope, ctx)
    }
}

impl Suite for ScriptSuite {
    fn load(&mut self, _ctx: &mut TestContext) -> CaseResult {
        self.ensure_manifest().map(|_| ())
    }

    fn cases(&self) -> Vec<TestCase<Self>> {
        self.manifest.as_ref().map_or_else(Vec::new, |manifest| {
            manifest
                .cases
                .iter()
                .enumerate()
                .map(|(index, case)| {
                    TestCase::new(case.name.trim(), move |suite: &mut Self, ctx: &mut TestContext| {
                        suite.run_case(index, ctx)
                    })
                })
                .collect()
        })
    }

    fn setup_suite(&mut self, ctx: &mut TestContext) -> CaseResult {
        let workdir_root = self.workdir_root.clone();
        let manifest = self.ensure_manifest()?;
        if let Some(description) = &manifest.description {
            ctx.log(description.clone());
        }
        let scope = StepScope {
            workdir: resolve_workdir(&workdir_root, manifest.workdir.as_deref()),
            env: manifest.env.clone(),
        };
        let steps = manifest.setup.steps.clone();
        let cleanup = manifest.setup.cleanup.clone();
        if !cleanup.is_empty() {
            let runner = self.runner.clone();
            let cleanup_scope = scope.clone();
            ctx.cleanup(move |ctx| runner.run_cleanup_steps(&cleanup, &cleanup_scope, ctx));
        }
        self.scope = Some(scope.clone());
        self.runner.run_steps(&steps, &scope, ctx)
    }
}
