// crates/mesh-suites-core/src/suite.rs
// ============================================================================
// Module: Suite Capability
// Description: Traits implemented by runnable test suites.
// Purpose: Define the typed suite lifecycle and its object-safe dispatch form.
// Dependencies: crate::{context, harness, report}
// ============================================================================

//! ## Overview
//! [`Suite`] is the typed surface suite authors implement: a list of named
//! cases plus optional lifecycle hooks. [`RunnableSuite`] is the object-safe
//! capability the dispatcher consumes; every [`Suite`] is runnable through
//! the shared harness via a blanket implementation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::context::CaseResult;
use crate::context::TestContext;
use crate::harness::SuiteHarness;
use crate::harness::run_suite;
use crate::identifiers::CaseName;
use crate::report::SuiteReport;

// ============================================================================
// SECTION: Test Cases
// ============================================================================

/// Case body signature.
type CaseBody<S> = Box<dyn Fn(&mut S, &mut TestContext) -> CaseResult + Send + Sync>;

/// A named case bound to a suite type.
pub struct TestCase<S> {
    /// Case name reported by the harness.
    name: CaseName,
    /// Case body.
    body: CaseBody<S>,
}

impl<S> TestCase<S> {
    /// Creates a case from a name and a body.
    pub fn new<F>(name: impl Into<CaseName>, body: F) -> Self
    where
        F: Fn(&mut S, &mut TestContext) -> CaseResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// Returns the case name.
    #[must_use]
    pub const fn name(&self) -> &CaseName {
        &self.name
    }

    /// Runs the case body against the suite.
    pub(crate) fn call(&self, suite: &mut S, ctx: &mut TestContext) -> CaseResult {
        (self.body)(suite, ctx)
    }
}

// ============================================================================
// SECTION: Suite Trait
// ============================================================================

/// A named collection of related test cases with lifecycle hooks.
///
/// Hook order per run: `load`, then `setup_suite`, then for each selected case
/// `setup_case`, the case body, `teardown_case`, case cleanups; finally
/// `teardown_suite` and suite-level cleanups.
pub trait Suite: Send + 'static {
    /// Returns the cases of this suite in execution order.
    ///
    /// Queried after `load` succeeds and before `setup_suite`.
    fn cases(&self) -> Vec<TestCase<Self>>
    where
        Self: Sized;

    /// Reads whatever the case list depends on, without side effects.
    ///
    /// # Errors
    ///
    /// Returning an error fails the suite; no setup hook or case runs.
    fn load(&mut self, _ctx: &mut TestContext) -> CaseResult {
        Ok(())
    }

    /// Prepares shared state before any case runs.
    ///
    /// Not called when the filter selects none of the suite's cases.
    ///
    /// # Errors
    ///
    /// Returning an error fails the suite; no cases run.
    fn setup_suite(&mut self, _ctx: &mut TestContext) -> CaseResult {
        Ok(())
    }

    /// Prepares per-case state.
    ///
    /// # Errors
    ///
    /// Returning an error fails the case; its body is not run.
    fn setup_case(&mut self, _ctx: &mut TestContext) -> CaseResult {
        Ok(())
    }

    /// Releases per-case state. Always called after `setup_case`.
    fn teardown_case(&mut self, _ctx: &mut TestContext) {}

    /// Releases shared state. Called only when `setup_suite` succeeded.
    fn teardown_suite(&mut self, _ctx: &mut TestContext) {}
}

// ============================================================================
// SECTION: Runnable Capability
// ============================================================================

/// Object-safe capability: run under a harness and report outcomes.
pub trait RunnableSuite: Send {
    /// Runs every selected case and returns the suite report.
    fn run(&mut self, harness: &SuiteHarness) -> SuiteReport;
}

impl<S: Suite> RunnableSuite for S {
    fn run(&mut self, harness: &SuiteHarness) -> SuiteReport {
        run_suite(self, harness)
    }
}
