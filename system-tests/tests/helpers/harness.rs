// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Dispatch Harness
// Description: Helpers that build and dispatch compiled-in suite groups.
// Purpose: Run suite groups the same way the `mesh-suites` binary does.
// Dependencies: mesh-suites-cli, mesh-suites-config, mesh-suites-core
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use mesh_suites_cli::SuiteGroup;
use mesh_suites_cli::build_registry;
use mesh_suites_cli::dispatch_options;
use mesh_suites_cli::script_options;
use mesh_suites_config::EventSinkKind;
use mesh_suites_config::MeshSuitesConfig;
use mesh_suites_core::Dispatcher;
use mesh_suites_core::Outcome;
use mesh_suites_core::RunEventSink;
use mesh_suites_core::RunReport;
use mesh_suites_core::render_text;

/// Loads `mesh-suites.toml` (or `MESH_SUITES_CONFIG`) plus env overrides.
pub fn load_config() -> Result<MeshSuitesConfig, String> {
    let config = MeshSuitesConfig::load(None).map_err(|err| format!("failed to load config: {err}"))?;
    config.validate().map_err(|err| format!("invalid config: {err}"))?;
    Ok(config)
}

/// Returns the directory holding the hermetic fixture manifests.
pub fn fixture_suites_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join("suites")
}

/// Builds a config that runs fixture manifests with step output under `workdir_root`.
pub fn fixture_config(workdir_root: &Path) -> MeshSuitesConfig {
    let mut config = MeshSuitesConfig::default();
    config.scripts.suites_dir = fixture_suites_dir().display().to_string();
    config.scripts.workdir_root = Some(workdir_root.display().to_string());
    config.scripts.default_step_timeout_secs = 30;
    config.events.sink = EventSinkKind::None;
    config
}

/// Dispatches a suite group with the given configuration.
pub async fn run_group(
    group: SuiteGroup,
    config: &MeshSuitesConfig,
    events: Arc<dyn RunEventSink>,
) -> Result<RunReport, String> {
    let registry = build_registry(group, &script_options(&config.scripts))
        .map_err(|err| format!("failed to build registry: {err}"))?;
    let dispatcher = Dispatcher::new(dispatch_options(&config.run)).with_events(events);
    Ok(dispatcher.run(registry).await)
}

/// Fails with the rendered report when any suite failed or errored.
pub fn ensure_passed(report: &RunReport) -> Result<(), String> {
    if report.is_success() {
        return Ok(());
    }
    Err(format!("suite run did not pass:\n{}", render_text(report, true)))
}

/// Fails unless every suite in the report passed.
pub fn ensure_all_passed(report: &RunReport) -> Result<(), String> {
    let all_passed = report.suites.iter().all(|suite| suite.outcome == Outcome::Pass);
    if all_passed {
        return Ok(());
    }
    Err(format!("not every suite passed:\n{}", render_text(report, true)))
}

/// Fails unless the report lists exactly `expected` in order.
pub fn ensure_order(report: &RunReport, expected: &[&str]) -> Result<(), String> {
    let names = report.names();
    if names == expected {
        return Ok(());
    }
    Err(format!("unexpected suite order: {}", names.join(", ")))
}
