// system-tests/tests/suites/dispatch.rs
// ============================================================================
// Module: Dispatch Tests
// Description: End-to-end dispatch of the compiled-in catalog over fixtures.
// Purpose: Ensure every registered suite runs, reports, and cleans up in order.
// Dependencies: system-tests helpers, mesh-suites-cli, mesh-suites-core
// ============================================================================

//! ## Overview
//! Runs the full catalog against the hermetic manifests under
//! `fixtures/suites`, so the registry, script runner, dispatcher, and report
//! artifacts are exercised together without a cluster.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use mesh_suites_cli::INTERDOMAIN;
use mesh_suites_cli::SINGLE_CLUSTER;
use mesh_suites_cli::SuiteGroup;
use mesh_suites_core::MemoryEventSink;
use mesh_suites_core::NoopEventSink;
use mesh_suites_core::Outcome;
use mesh_suites_core::RunEventKind;

use crate::helpers;
use crate::helpers::artifacts::TestReporter;

/// Suite names of the whole catalog in registration order.
fn catalog_names() -> Vec<&'static str> {
    SINGLE_CLUSTER.iter().chain(INTERDOMAIN).map(|entry| entry.name).collect()
}

/// Reads the trace a fixture suite appended to `<suite>.log`.
fn suite_log(root: &Path, suite: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(root.join(format!("{suite}.log")))?;
    Ok(text.lines().map(str::to_string).collect())
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_runs_every_suite_in_catalog_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("dispatch_runs_every_suite_in_catalog_order")?;
    let workdir = tempfile::tempdir()?;
    let config = helpers::harness::fixture_config(workdir.path());

    let report =
        helpers::harness::run_group(SuiteGroup::All, &config, Arc::new(NoopEventSink)).await?;
    helpers::harness::ensure_all_passed(&report)?;
    helpers::harness::ensure_order(&report, &catalog_names())?;

    let heal = suite_log(workdir.path(), "heal")?;
    let expected = vec![
        "setup heal",
        "run TestNsmgrRestart",
        "cleanup TestNsmgrRestart",
        "run TestRegistryRestart",
        "cleanup TestRegistryRestart",
        "run TestNseRestart",
        "cleanup TestNseRestart",
        "teardown heal",
    ];
    if heal != expected {
        return Err(format!("unexpected heal trace: {}", heal.join(" | ")).into());
    }
    for name in catalog_names() {
        let log = suite_log(workdir.path(), name)?;
        if log.first().map(String::as_str) != Some(format!("setup {name}").as_str())
            || log.last().map(String::as_str) != Some(format!("teardown {name}").as_str())
        {
            return Err(format!("suite {name} did not run its lifecycle").into());
        }
    }

    reporter.finish_with_report(&report)?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn parallel_dispatch_keeps_registration_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("parallel_dispatch_keeps_registration_order")?;
    let workdir = tempfile::tempdir()?;
    let mut config = helpers::harness::fixture_config(workdir.path());
    config.run.parallelism = 3;

    let report =
        helpers::harness::run_group(SuiteGroup::All, &config, Arc::new(NoopEventSink)).await?;
    helpers::harness::ensure_all_passed(&report)?;
    helpers::harness::ensure_order(&report, &catalog_names())?;
    let cases = report.case_counts();
    if cases.passed != 19 || cases.failed + cases.errored + cases.skipped != 0 {
        return Err(format!("unexpected case totals: {} passed", cases.passed).into());
    }

    reporter.finish_with_report(&report)?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn suite_filter_skips_unselected_suites() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("suite_filter_skips_unselected_suites")?;
    let workdir = tempfile::tempdir()?;
    let mut config = helpers::harness::fixture_config(workdir.path());
    config.run.filter = vec!["heal".to_string()];
    config.run.exact = true;

    let report =
        helpers::harness::run_group(SuiteGroup::SingleCluster, &config, Arc::new(NoopEventSink))
            .await?;
    if !report.is_success() {
        return Err("filtered run should succeed".into());
    }
    for suite in &report.suites {
        let expected = if suite.name.as_str() == "heal" { Outcome::Pass } else { Outcome::Skip };
        if suite.outcome != expected {
            return Err(format!("suite {} has outcome {}", suite.name, suite.outcome.as_str()).into());
        }
    }
    if workdir.path().join("basic.log").exists() {
        return Err("skipped suite executed steps".into());
    }

    reporter.finish_with_report(&report)?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn case_filter_runs_only_selected_cases() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("case_filter_runs_only_selected_cases")?;
    let workdir = tempfile::tempdir()?;
    let mut config = helpers::harness::fixture_config(workdir.path());
    config.run.filter = vec!["basic/TestKernel2Kernel".to_string()];
    config.run.exact = true;

    let report =
        helpers::harness::run_group(SuiteGroup::SingleCluster, &config, Arc::new(NoopEventSink))
            .await?;
    let basic = report.suite("basic").ok_or("basic suite missing from report")?;
    let names: Vec<&str> = basic.cases.iter().map(|case| case.name.as_str()).collect();
    if basic.outcome != Outcome::Pass || names != ["TestKernel2Kernel"] {
        return Err(format!("unexpected basic cases: {}", names.join(", ")).into());
    }
    let log = suite_log(workdir.path(), "basic")?;
    if log.iter().any(|line| line.contains("TestMemif2Memif")) {
        return Err("filtered case executed steps".into());
    }

    reporter.finish_with_report(&report)?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unmatched_case_filter_leaves_suite_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("unmatched_case_filter_leaves_suite_untouched")?;
    let workdir = tempfile::tempdir()?;
    let mut config = helpers::harness::fixture_config(workdir.path());
    config.run.filter = vec!["heal/Nonexistent".to_string()];
    config.run.exact = true;

    let report =
        helpers::harness::run_group(SuiteGroup::SingleCluster, &config, Arc::new(NoopEventSink))
            .await?;
    let heal = report.suite("heal").ok_or("heal suite missing from report")?;
    if heal.outcome != Outcome::Skip || !heal.cases.is_empty() {
        return Err(format!("heal should be skipped without cases, got {}", heal.outcome.as_str()).into());
    }
    if workdir.path().join("heal.log").exists() {
        return Err("heal setup ran although no case was selected".into());
    }

    reporter.finish_with_report(&report)?;
    drop(reporter);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatch_emits_run_events() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("dispatch_emits_run_events")?;
    let workdir = tempfile::tempdir()?;
    let config = helpers::harness::fixture_config(workdir.path());
    let sink = Arc::new(MemoryEventSink::new());

    let report =
        helpers::harness::run_group(SuiteGroup::Interdomain, &config, sink.clone()).await?;
    helpers::harness::ensure_passed(&report)?;

    let events = sink.events();
    let started = matches!(
        events.first().map(|event| &event.kind),
        Some(RunEventKind::RunStarted { suite_count: Some(2) })
    );
    let finished = matches!(
        events.last().map(|event| &event.kind),
        Some(RunEventKind::RunFinished { success: true, .. })
    );
    let suites_finished = events
        .iter()
        .filter(|event| matches!(event.kind, RunEventKind::SuiteFinished { .. }))
        .count();
    let cases_finished = events
        .iter()
        .filter(|event| matches!(event.kind, RunEventKind::CaseFinished { .. }))
        .count();
    if !started || !finished || suites_finished != 2 || cases_finished != 4 {
        return Err(format!(
            "unexpected event stream: {} events, {suites_finished} suites, {cases_finished} cases",
            events.len()
        )
        .into());
    }
    reporter.artifacts().write_json("events.json", &events)?;

    reporter.finish_with_report(&report)?;
    drop(reporter);
    Ok(())
}
