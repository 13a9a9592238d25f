// crates/mesh-suites-core/tests/support/mod.rs
// ============================================================================
// Module: Core Test Support
// Description: Configurable fixture suites shared by core integration tests.
// Purpose: Drive the harness through every case outcome and hook failure.
// Dependencies: mesh-suites-core
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are used selectively per test binary.")]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use mesh_suites_core::CaseError;
use mesh_suites_core::CaseResult;
use mesh_suites_core::Suite;
use mesh_suites_core::TestCase;
use mesh_suites_core::TestContext;

/// Ordered record of lifecycle calls.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Behavior of one fixture case body.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Pass,
    Fail(&'static str),
    NonFatal(&'static str),
    Skip(&'static str),
    Panic(&'static str),
    Sleep(Duration),
}

/// Behavior of `setup_suite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setup {
    Ok,
    Fail,
    Panic,
}

/// Suite whose cases and hooks follow a fixed script.
pub struct FixtureSuite {
    pub journal: Journal,
    pub setup: Setup,
    pub fail_setup_case: Option<&'static str>,
    pub cases: Vec<(&'static str, Step)>,
}

impl FixtureSuite {
    pub fn new(cases: &[(&'static str, Step)]) -> Self {
        Self {
            journal: Arc::new(Mutex::new(Vec::new())),
            setup: Setup::Ok,
            fail_setup_case: None,
            cases: cases.to_vec(),
        }
    }

    pub fn passing() -> Self {
        Self::new(&[("TestA", Step::Pass), ("TestB", Step::Pass)])
    }

    pub fn with_setup(mut self, setup: Setup) -> Self {
        self.setup = setup;
        self
    }

    pub fn journal(&self) -> Journal {
        Arc::clone(&self.journal)
    }

    fn note(&self, entry: impl Into<String>) {
        self.journal.lock().unwrap().push(entry.into());
    }

    fn execute(&mut self, name: &'static str, step: Step, ctx: &mut TestContext) -> CaseResult {
        self.note(format!("body:{name}"));
        let journal = Arc::clone(&self.journal);
        ctx.cleanup(move |_| journal.lock().unwrap().push(format!("cleanup:{name}")));
        match step {
            Step::Pass => Ok(()),
            Step::Fail(message) => Err(CaseError::failed(message)),
            Step::NonFatal(message) => {
                ctx.error(message);
                ctx.log("continued after non-fatal failure");
                Ok(())
            }
            Step::Skip(reason) => Err(ctx.skip(reason)),
            Step::Panic(message) => panic!("{message}"),
            Step::Sleep(duration) => {
                let deadline = Instant::now() + duration;
                while Instant::now() < deadline {
                    if ctx.is_cancelled() {
                        return Err(CaseError::failed("cancelled"));
                    }
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(())
            }
        }
    }
}

impl Suite for FixtureSuite {
    fn cases(&self) -> Vec<TestCase<Self>> {
        self.cases
            .iter()
            .map(|&(name, step)| {
                TestCase::new(name, move |suite: &mut Self, ctx: &mut TestContext| {
                    suite.execute(name, step, ctx)
                })
            })
            .collect()
    }

    fn setup_suite(&mut self, _ctx: &mut TestContext) -> CaseResult {
        self.note("setup_suite");
        match self.setup {
            Setup::Ok => Ok(()),
            Setup::Fail => Err(CaseError::failed("cluster unreachable")),
            Setup::Panic => panic!("kubeconfig missing"),
        }
    }

    fn setup_case(&mut self, ctx: &mut TestContext) -> CaseResult {
        let name = ctx.name().as_str().to_string();
        self.note(format!("setup_case:{name}"));
        if self.fail_setup_case == Some(name.as_str()) {
            return Err(CaseError::failed("namespace not ready"));
        }
        Ok(())
    }

    fn teardown_case(&mut self, ctx: &mut TestContext) {
        let name = ctx.name().as_str().to_string();
        self.note(format!("teardown_case:{name}"));
    }

    fn teardown_suite(&mut self, _ctx: &mut TestContext) {
        self.note("teardown_suite");
    }
}

/// Returns a snapshot of the journal.
pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}
