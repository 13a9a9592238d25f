// crates/mesh-suites-core/tests/artifacts.rs
// ============================================================================
// Module: Report Artifact Tests
// Description: On-disk run artifacts and JSON renderings.
// Purpose: Ensure run reports are persisted and parse back unchanged.
// ============================================================================

//! Report artifact tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

mod support;

use std::fs;
use std::sync::Arc;

use mesh_suites_core::DispatchOptions;
use mesh_suites_core::Dispatcher;
use mesh_suites_core::FileEventSink;
use mesh_suites_core::ReportArtifacts;
use mesh_suites_core::RunEventSink;
use mesh_suites_core::RunReport;
use mesh_suites_core::SuiteName;
use mesh_suites_core::SuiteRegistry;
use mesh_suites_core::SuiteReport;
use mesh_suites_core::artifacts::artifact_file_stem;
use mesh_suites_core::render_json;
use support::FixtureSuite;
use support::Step;

fn sample_report() -> RunReport {
    let registry = SuiteRegistry::new()
        .with("basic", FixtureSuite::passing())
        .unwrap()
        .with("k8s_monolith", FixtureSuite::new(&[("TestSmoke", Step::Fail("pods not ready"))]))
        .unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    runtime.block_on(Dispatcher::new(DispatchOptions::default()).run(registry))
}

#[test]
fn write_report_persists_run_and_suite_files() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ReportArtifacts::new(dir.path().join("run-1")).unwrap();
    let report = sample_report();
    let written = artifacts.write_report(&report).unwrap();

    assert_eq!(written.len(), 4);
    let json = fs::read(artifacts.root().join("report.json")).unwrap();
    let parsed: RunReport = serde_json::from_slice(&json).unwrap();
    assert_eq!(parsed, report);

    let suite: SuiteReport =
        serde_json::from_slice(&fs::read(artifacts.root().join("suites/k8s_monolith.json")).unwrap())
            .unwrap();
    assert_eq!(suite.name.as_str(), "k8s_monolith");

    let markdown = fs::read_to_string(artifacts.root().join("report.md")).unwrap();
    assert!(markdown.contains("- k8s_monolith/TestSmoke: pods not ready"));
}

#[test]
fn render_json_uses_snake_case_outcomes() {
    let rendered = render_json(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(value["suites"][0]["outcome"], "pass");
    assert_eq!(value["suites"][1]["outcome"], "fail");
    assert_eq!(value["suites"][1]["cases"][0]["name"], "TestSmoke");
}

#[test]
fn file_stems_are_filesystem_safe() {
    assert_eq!(artifact_file_stem("floating_interdomain"), "floating_interdomain");
    assert_eq!(artifact_file_stem("a/b c"), "a_b_c");
    assert_eq!(artifact_file_stem(".."), "_..");
}

#[test]
fn colliding_suite_names_get_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = ReportArtifacts::new(dir.path().join("run-2")).unwrap();
    let report = RunReport {
        started_at_ms: 0,
        duration_ms: 0,
        suites: ["a b", "a_b", "A_B"]
            .into_iter()
            .map(|name| SuiteReport::skipped(SuiteName::new(name), "not selected by filter"))
            .collect(),
    };
    let written = artifacts.write_report(&report).unwrap();

    assert_eq!(written.len(), 5);
    for (file, name) in [("a_b.json", "a b"), ("a_b_2.json", "a_b"), ("A_B_3.json", "A_B")] {
        let bytes = fs::read(artifacts.root().join("suites").join(file)).unwrap();
        let suite: SuiteReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(suite.name.as_str(), name);
    }
}

#[test]
fn file_event_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let sink = Arc::new(FileEventSink::new(&path).unwrap());
    let registry = SuiteRegistry::new().with("basic", FixtureSuite::passing()).unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    runtime.block_on(
        Dispatcher::new(DispatchOptions::default())
            .with_events(Arc::clone(&sink) as Arc<dyn RunEventSink>)
            .run(registry),
    );

    let contents = fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> =
        contents.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    let kinds: Vec<&str> = events.iter().map(|event| event["event"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            "run_started",
            "suite_started",
            "case_finished",
            "case_finished",
            "suite_finished",
            "run_finished"
        ]
    );
    assert!(events.iter().all(|event| event["timestamp_ms"].is_u64()));
}
