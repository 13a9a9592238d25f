// system-tests/tests/suites/single_cluster.rs
// ============================================================================
// Module: Single-Cluster Suite Tests
// Description: Runs the single-cluster suite group against a live deployment.
// Purpose: Gate releases on the real manifests passing end to end.
// Dependencies: system-tests helpers, mesh-suites-cli, mesh-suites-core
// ============================================================================

//! ## Overview
//! Loads `mesh-suites.toml` (or `MESH_SUITES_CONFIG`) with the usual
//! `MESH_SUITES_*` overrides and dispatches the single-cluster group. Requires the
//! `system-tests` feature and a reachable deployment.

use std::sync::Arc;

use mesh_suites_cli::SINGLE_CLUSTER;
use mesh_suites_cli::SuiteGroup;
use mesh_suites_core::StderrEventSink;

use crate::helpers;
use crate::helpers::artifacts::TestReporter;

#[tokio::test(flavor = "multi_thread")]
async fn single_cluster_group_passes() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("single_cluster_group_passes")?;
    let config = helpers::harness::load_config()?;

    let report =
        helpers::harness::run_group(SuiteGroup::SingleCluster, &config, Arc::new(StderrEventSink)).await?;
    reporter.finish_with_report(&report)?;
    let expected: Vec<&str> = SINGLE_CLUSTER.iter().map(|entry| entry.name).collect();
    helpers::harness::ensure_order(&report, &expected)?;
    helpers::harness::ensure_passed(&report)?;

    drop(reporter);
    Ok(())
}
