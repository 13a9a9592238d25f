// crates/mesh-suites-cli/src/options.rs
// ============================================================================
// Module: Run Options
// Description: Translation of loaded configuration into runtime options.
// Purpose: Share one mapping between the binary and the system tests.
// Dependencies: mesh-suites-config, mesh-suites-core, mesh-suites-script
// ============================================================================

//! Maps `[run]` and `[scripts]` settings onto dispatcher and runner options.

use mesh_suites_config::RunConfig;
use mesh_suites_config::ScriptsConfig;
use mesh_suites_core::DispatchOptions;
use mesh_suites_core::SuiteFilter;
use mesh_suites_script::ScriptOptions;

/// Builds scripted-suite options from the `[scripts]` section.
#[must_use]
pub fn script_options(scripts: &ScriptsConfig) -> ScriptOptions {
    ScriptOptions::new(scripts.suites_dir.as_str())
        .with_workdir_root(scripts.workdir_root())
        .with_shell(scripts.shell.as_str())
        .with_default_step_timeout(scripts.default_step_timeout())
}

/// Builds dispatcher options from the `[run]` section.
#[must_use]
pub fn dispatch_options(run: &RunConfig) -> DispatchOptions {
    DispatchOptions {
        filter: SuiteFilter::new(&run.filter, run.exact),
        parallelism: run.parallelism(),
        suite_timeout: run.suite_timeout(),
        ..DispatchOptions::default()
    }
}
