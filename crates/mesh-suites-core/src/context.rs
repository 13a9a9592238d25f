// crates/mesh-suites-core/src/context.rs
// ============================================================================
// Module: Test Context
// Description: Per-case reporting surface handed to suite code.
// Purpose: Record failures, skips, logs, cleanups, and subtests for one case.
// Dependencies: thiserror, tokio-util
// ============================================================================

//! ## Overview
//! A [`TestContext`] is created by the harness for every case and for the
//! suite lifecycle itself. Suite code reports through it: non-fatal failures
//! via [`TestContext::error`], fatal ones by returning a [`CaseError`].
//! Panics are caught at every phase boundary and recorded as errors, so they
//! never escape the case that raised them.
//!
//! Every context carries the cancellation token of its suite run. Long
//! running suite code polls [`TestContext::is_cancelled`] and returns early
//! once the dispatcher gives up on the suite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::identifiers::CaseName;
use crate::report::CaseReport;
use crate::report::Outcome;
use crate::report::duration_millis;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal result of a case phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    /// The case failed and must stop.
    #[error("{0}")]
    Failed(String),
    /// The case chose to skip itself.
    #[error("skipped: {0}")]
    Skipped(String),
}

impl CaseError {
    /// Builds a fatal failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Builds a skip.
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }
}

/// Result type returned by suite hooks and case bodies.
pub type CaseResult = Result<(), CaseError>;

/// Outcome of a phase run under panic isolation.
pub(crate) type PhaseResult = std::thread::Result<CaseResult>;

/// Cleanup callback registered by suite code.
type Cleanup = Box<dyn FnOnce(&mut TestContext) + Send>;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Lifecycle phase labels used in recorded messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// `Suite::setup_suite`.
    SetupSuite,
    /// `Suite::setup_case`.
    SetupCase,
    /// The case body or subtest body.
    Body,
    /// `Suite::teardown_case`.
    TeardownCase,
    /// `Suite::teardown_suite`.
    TeardownSuite,
    /// A registered cleanup callback.
    Cleanup,
}

impl Phase {
    /// Returns the label used as a message prefix.
    const fn label(self) -> &'static str {
        match self {
            Self::SetupSuite => "setup_suite",
            Self::SetupCase => "setup_case",
            Self::Body => "body",
            Self::TeardownCase => "teardown_case",
            Self::TeardownSuite => "teardown_suite",
            Self::Cleanup => "cleanup",
        }
    }
}

/// Runs a phase and converts panics into a [`PhaseResult`].
pub(crate) fn catch_phase<F>(phase: F) -> PhaseResult
where
    F: FnOnce() -> CaseResult,
{
    panic::catch_unwind(AssertUnwindSafe(phase))
}

/// Extracts a readable message from a panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}

// ============================================================================
// SECTION: Test Context
// ============================================================================

/// Reporting surface for one case, subtest, or suite lifecycle.
pub struct TestContext {
    /// Leaf name reported for this context.
    name: CaseName,
    /// Slash-separated path (`suite/case/subtest`).
    path: String,
    /// Failure, error, and skip messages.
    messages: Vec<String>,
    /// Informational log lines.
    log: Vec<String>,
    /// Set once a non-fatal or fatal failure is recorded.
    failed: bool,
    /// Set once a panic is recorded.
    errored: bool,
    /// Set once the case skips itself.
    skipped: bool,
    /// Reports of completed subtests.
    subcases: Vec<CaseReport>,
    /// Registered cleanups, run last-in first-out.
    cleanups: Vec<Cleanup>,
    /// Creation time, used for the reported duration.
    started: Instant,
    /// Cancellation shared by every context of one suite run.
    cancel: CancellationToken,
}

impl TestContext {
    /// Creates a context for the given leaf name and full path.
    pub(crate) fn new(
        name: impl Into<CaseName>,
        path: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            messages: Vec::new(),
            log: Vec::new(),
            failed: false,
            errored: false,
            skipped: false,
            subcases: Vec::new(),
            cleanups: Vec::new(),
            started: Instant::now(),
            cancel,
        }
    }

    /// Returns the leaf name of this context.
    #[must_use]
    pub const fn name(&self) -> &CaseName {
        &self.name
    }

    /// Returns the slash-separated path of this context.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true once the surrounding suite run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns the cancellation token of the surrounding suite run.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Records an informational log line.
    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Records a non-fatal failure; execution continues.
    pub fn error(&mut self, message: impl Into<String>) {
        self.failed = true;
        self.messages.push(message.into());
    }

    /// Records a non-fatal failure when `condition` is false.
    ///
    /// Returns `condition`.
    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            self.error(message);
        }
        condition
    }

    /// Fatal assertion: returns an error to propagate with `?` when
    /// `condition` is false.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::Failed`] when the condition does not hold.
    pub fn require(&self, condition: bool, message: impl Into<String>) -> CaseResult {
        if condition { Ok(()) } else { Err(CaseError::failed(message)) }
    }

    /// Builds a fatal failure to return from the current phase.
    #[must_use]
    pub fn fail_now(&self, message: impl Into<String>) -> CaseError {
        CaseError::failed(message)
    }

    /// Builds a skip to return from the current phase.
    #[must_use]
    pub fn skip(&self, reason: impl Into<String>) -> CaseError {
        CaseError::skipped(reason)
    }

    /// Registers a cleanup that runs after the case completes.
    ///
    /// Cleanups run last-in first-out, after `teardown_case`, regardless of
    /// how the case ended.
    pub fn cleanup<F>(&mut self, cleanup: F)
    where
        F: FnOnce(&mut Self) + Send + 'static,
    {
        self.cleanups.push(Box::new(cleanup));
    }

    /// Runs a named subtest with its own context.
    ///
    /// A failing or panicking subtest marks this context as failed. Returns
    /// true when the subtest did not fail.
    pub fn run<F>(&mut self, name: &str, body: F) -> bool
    where
        F: FnOnce(&mut Self) -> CaseResult,
    {
        let mut child = Self::new(name, format!("{}/{name}", self.path), self.cancel.clone());
        let result = catch_phase(|| body(&mut child));
        child.absorb(Phase::Body, result);
        child.run_cleanups();
        let report = child.finish();
        let passed = !report.is_failure();
        if !passed {
            self.failed = true;
        }
        self.subcases.push(report);
        passed
    }

    /// Returns true once a failure or panic has been recorded.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.failed || self.errored
    }

    /// Marks this context skipped with a bare reason.
    pub(crate) fn skip_with(&mut self, reason: impl Into<String>) {
        self.skipped = true;
        self.messages.push(reason.into());
    }

    /// Folds the result of a phase into this context.
    pub(crate) fn absorb(&mut self, phase: Phase, result: PhaseResult) {
        let prefix = match phase {
            Phase::Body => String::new(),
            other => format!("{}: ", other.label()),
        };
        match result {
            Ok(Ok(())) => {}
            Ok(Err(CaseError::Failed(message))) => {
                self.failed = true;
                self.messages.push(format!("{prefix}{message}"));
            }
            Ok(Err(CaseError::Skipped(reason))) => {
                self.skipped = true;
                self.messages.push(format!("{prefix}skipped: {reason}"));
            }
            Err(payload) => {
                self.errored = true;
                self.messages
                    .push(format!("panic in {}: {}", phase.label(), panic_message(payload.as_ref())));
            }
        }
    }

    /// Runs registered cleanups last-in first-out, isolating panics.
    pub(crate) fn run_cleanups(&mut self) {
        while let Some(cleanup) = self.cleanups.pop() {
            let result = catch_phase(|| {
                cleanup(&mut *self);
                Ok(())
            });
            self.absorb(Phase::Cleanup, result);
        }
    }

    /// Current outcome derived from recorded state.
    #[must_use]
    pub(crate) const fn outcome(&self) -> Outcome {
        if self.errored {
            Outcome::Error
        } else if self.failed {
            Outcome::Fail
        } else if self.skipped {
            Outcome::Skip
        } else {
            Outcome::Pass
        }
    }

    /// Consumes the context and produces its report.
    pub(crate) fn finish(self) -> CaseReport {
        CaseReport {
            outcome: self.outcome(),
            name: self.name,
            messages: self.messages,
            log: self.log,
            duration_ms: duration_millis(self.started.elapsed()),
            subcases: self.subcases,
        }
    }
}
