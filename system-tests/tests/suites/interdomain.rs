// system-tests/tests/suites/interdomain.rs
// ============================================================================
// Module: Interdomain Suite Tests
// Description: Runs the interdomain suite group against a live deployment.
// Purpose: Gate releases on the real manifests passing end to end.
// Dependencies: system-tests helpers, mesh-suites-cli, mesh-suites-core
// ============================================================================

//! ## Overview
//! Loads `mesh-suites.toml` (or `MESH_SUITES_CONFIG`) with the usual
//! `MESH_SUITES_*` overrides and dispatches the interdomain group. Requires the
//! `system-tests` feature and a reachable deployment.

use std::sync::Arc;

use mesh_suites_cli::INTERDOMAIN;
use mesh_suites_cli::SuiteGroup;
use mesh_suites_core::StderrEventSink;

use crate::helpers;
use crate::helpers::artifacts::TestReporter;

#[tokio::test(flavor = "multi_thread")]
async fn interdomain_group_passes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("interdomain_group_passes")?;
    let config = helpers::harness::load_config()?;

    let report =
        helpers::harness::run_group(SuiteGroup::Interdomain, &config, Arc::new(StderrEventSink)).await?;
    reporter.finish_with_report(&report)?;
    let expected: Vec<&str> = INTERDOMAIN.iter().map(|entry| entry.name).collect();
    helpers::harness::ensure_order(&report, &expected)?;
    helpers::harness::ensure_passed(&report)?;

    drop(reporter);
    Ok(())
}
