// crates/mesh-suites-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and option assembly.
// Purpose: Ensure command-line flags override configuration as documented.
// Dependencies: mesh-suites-cli main helpers
// ============================================================================

//! ## Overview
//! Covers flag parsing and the way `run` flags override loaded
//! configuration.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use mesh_suites_config::EventSinkKind;
use mesh_suites_config::EventsConfig;
use mesh_suites_config::MeshSuitesConfig;

use super::Cli;
use super::Commands;
use super::OutputFormat;
use super::RunCommand;
use super::SuiteGroup;
use super::apply_run_overrides;
use super::event_sink;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse_run(args: &[&str]) -> RunCommand {
    let argv = std::iter::once("mesh-suites").chain(std::iter::once("run")).chain(args.iter().copied());
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Run(command) => command,
        other => panic!("expected run command, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn run_defaults_to_all_suites_as_text() {
    let command = parse_run(&[]);
    assert_eq!(command.group, SuiteGroup::All);
    assert_eq!(command.format, OutputFormat::Text);
    assert!(command.filter.is_empty());
    assert!(!command.exact);
}

#[test]
fn run_accepts_repeated_filters_and_group() {
    let command = parse_run(&[
        "--group",
        "single-cluster",
        "--filter",
        "heal",
        "--filter",
        "basic/TestKernel2Kernel",
        "--exact",
        "--parallelism",
        "3",
        "--timeout-secs",
        "900",
        "--format",
        "json",
    ]);
    assert_eq!(command.group, SuiteGroup::SingleCluster);
    assert_eq!(command.filter, vec!["heal".to_string(), "basic/TestKernel2Kernel".to_string()]);
    assert!(command.exact);
    assert_eq!(command.parallelism, Some(3));
    assert_eq!(command.timeout_secs, Some(900));
    assert_eq!(command.format, OutputFormat::Json);
}

#[test]
fn unknown_group_is_a_usage_error() {
    assert!(Cli::try_parse_from(["mesh-suites", "run", "--group", "multicluster"]).is_err());
    assert!(Cli::try_parse_from(["mesh-suites", "list", "--group", "interdomain"]).is_ok());
}

#[test]
fn flags_override_config_values() {
    let mut config = MeshSuitesConfig::default();
    config.run.filter = vec!["memory".to_string()];
    let command = RunCommand {
        filter: vec!["heal".to_string()],
        exact: true,
        parallelism: Some(4),
        timeout_secs: Some(60),
        report_dir: Some("out/reports".to_string()),
        ..RunCommand::default()
    };
    apply_run_overrides(&mut config, &command);

    assert_eq!(config.run.filter, vec!["heal".to_string()]);
    assert!(config.run.exact);
    assert_eq!(config.run.parallelism, 4);
    assert_eq!(config.run.suite_timeout_secs, Some(60));
    assert!(config.artifacts.enabled);
    assert_eq!(config.artifacts.root, "out/reports");
}

#[test]
fn absent_flags_keep_config_values() {
    let mut config = MeshSuitesConfig::default();
    config.run.filter = vec!["memory".to_string()];
    config.run.parallelism = 2;
    apply_run_overrides(&mut config, &RunCommand::default());

    assert_eq!(config.run.filter, vec!["memory".to_string()]);
    assert_eq!(config.run.parallelism, 2);
    assert!(!config.artifacts.enabled);
}

#[test]
fn file_sink_requires_an_openable_path() {
    let dir = tempfile::tempdir().unwrap();
    let events = EventsConfig {
        sink: EventSinkKind::File,
        path: Some(dir.path().join("events.jsonl").display().to_string()),
    };
    assert!(event_sink(&events).is_ok());

    let missing = EventsConfig {
        sink: EventSinkKind::File,
        path: Some(dir.path().join("absent/events.jsonl").display().to_string()),
    };
    let err = event_sink(&missing).err().unwrap();
    assert!(err.to_string().starts_with("failed to open event log"));

    let none = EventsConfig {
        sink: EventSinkKind::None,
        path: None,
    };
    assert!(event_sink(&none).is_ok());
}
