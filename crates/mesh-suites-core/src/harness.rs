// crates/mesh-suites-core/src/harness.rs
// ============================================================================
// Module: Suite Harness
// Description: Shared lifecycle runner for a single suite.
// Purpose: Execute hooks and cases with panic isolation and report outcomes.
// Dependencies: tokio-util, crate::{context, events, filter, report, suite}
// ============================================================================

//! ## Overview
//! [`run_suite`] drives one [`Suite`] through its lifecycle. Every hook and
//! case body runs inside a panic boundary; a panic is recorded against the
//! phase that raised it and the harness moves on. Teardown hooks and
//! cleanups run even when earlier phases failed.
//!
//! Cases are resolved after `load` and before `setup_suite`, so a filter
//! that selects none of a suite's cases skips the suite without touching its
//! environment. Once the harness token is cancelled no further case starts
//! and no more events are emitted; the dispatcher reports the suite instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::context::Phase;
use crate::context::TestContext;
use crate::context::catch_phase;
use crate::events::NoopEventSink;
use crate::events::RunEvent;
use crate::events::RunEventSink;
use crate::filter::SuiteFilter;
use crate::identifiers::SuiteName;
use crate::report::CaseReport;
use crate::report::Outcome;
use crate::report::SuiteReport;
use crate::report::duration_millis;
use crate::suite::Suite;
use crate::suite::TestCase;

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Execution context shared by every phase of one suite run.
#[derive(Clone)]
pub struct SuiteHarness {
    /// Registered name of the suite being run.
    name: SuiteName,
    /// Case selection.
    filter: SuiteFilter,
    /// Destination for run events.
    events: Arc<dyn RunEventSink>,
    /// Cancelled when the run must stop early.
    cancel: CancellationToken,
}

impl SuiteHarness {
    /// Creates a harness for the named suite.
    #[must_use]
    pub fn new(name: SuiteName, filter: SuiteFilter, events: Arc<dyn RunEventSink>) -> Self {
        Self {
            name,
            filter,
            events,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a harness that runs every case and discards events.
    #[must_use]
    pub fn standalone(name: impl Into<SuiteName>) -> Self {
        Self::new(name.into(), SuiteFilter::default(), Arc::new(NoopEventSink))
    }

    /// Replaces the cancellation token observed by this harness.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the suite name.
    #[must_use]
    pub const fn name(&self) -> &SuiteName {
        &self.name
    }

    /// Returns the cancellation token observed by this harness.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Records an event unless the run has been cancelled.
    fn record(&self, event: &RunEvent) {
        if !self.cancel.is_cancelled() {
            self.events.record(event);
        }
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Runs a suite through its full lifecycle and returns its report.
pub fn run_suite<S: Suite>(suite: &mut S, harness: &SuiteHarness) -> SuiteReport {
    let started = Instant::now();
    harness.record(&RunEvent::suite_started(&harness.name));

    let mut lifecycle =
        TestContext::new(harness.name.as_str(), harness.name.as_str(), harness.cancel.clone());
    let cases = resolve_cases(suite, harness, &mut lifecycle);

    let mut reports = Vec::new();
    if let Some(cases) = cases {
        let setup = catch_phase(|| suite.setup_suite(&mut lifecycle));
        let proceed = matches!(setup, Ok(Ok(())));
        lifecycle.absorb(Phase::SetupSuite, setup);
        if proceed {
            for case in &cases {
                if harness.cancel.is_cancelled() {
                    break;
                }
                let report = run_case(suite, case, harness);
                harness.record(&RunEvent::case_finished(&harness.name, &report));
                reports.push(report);
            }
            let teardown = catch_phase(|| {
                suite.teardown_suite(&mut lifecycle);
                Ok(())
            });
            lifecycle.absorb(Phase::TeardownSuite, teardown);
        }
    }
    lifecycle.run_cleanups();

    let lifecycle = lifecycle.finish();
    let mut all_cases = lifecycle.subcases;
    all_cases.extend(reports);
    let report = SuiteReport {
        name: harness.name.clone(),
        outcome: Outcome::aggregate(
            lifecycle.outcome,
            all_cases.iter().map(|case| case.outcome),
        ),
        messages: lifecycle.messages,
        log: lifecycle.log,
        cases: all_cases,
        duration_ms: duration_millis(started.elapsed()),
    };
    harness.record(&RunEvent::suite_finished(&report));
    report
}

/// Loads the suite and returns the cases selected by the harness filter.
///
/// Returns `None` when loading failed, the case list panicked, or the filter
/// selects none of a non-empty case list; the lifecycle context records why.
fn resolve_cases<S: Suite>(
    suite: &mut S,
    harness: &SuiteHarness,
    lifecycle: &mut TestContext,
) -> Option<Vec<TestCase<S>>> {
    let load = catch_phase(|| suite.load(lifecycle));
    let loaded = matches!(load, Ok(Ok(())));
    lifecycle.absorb(Phase::SetupSuite, load);
    if !loaded {
        return None;
    }
    let cases = match panic::catch_unwind(AssertUnwindSafe(|| suite.cases())) {
        Ok(cases) => cases,
        Err(payload) => {
            lifecycle.absorb(Phase::SetupSuite, Err(payload));
            return None;
        }
    };
    let total = cases.len();
    let selected: Vec<TestCase<S>> = cases
        .into_iter()
        .filter(|case| harness.filter.matches_case(&harness.name, case.name()))
        .collect();
    if total > 0 && selected.is_empty() {
        lifecycle.skip_with("no cases selected by filter");
        return None;
    }
    Some(selected)
}

/// Runs one case: setup, body, teardown, then cleanups.
fn run_case<S: Suite>(suite: &mut S, case: &TestCase<S>, harness: &SuiteHarness) -> CaseReport {
    let path = format!("{}/{}", harness.name, case.name());
    let mut ctx = TestContext::new(case.name().clone(), path, harness.cancel.clone());

    let setup = catch_phase(|| suite.setup_case(&mut ctx));
    let proceed = matches!(setup, Ok(Ok(())));
    ctx.absorb(Phase::SetupCase, setup);
    if proceed {
        let body = catch_phase(|| case.call(suite, &mut ctx));
        ctx.absorb(Phase::Body, body);
    }
    let teardown = catch_phase(|| {
        suite.teardown_case(&mut ctx);
        Ok(())
    });
    ctx.absorb(Phase::TeardownCase, teardown);
    ctx.run_cleanups();
    ctx.finish()
}
