// crates/mesh-suites-core/src/report.rs
// ============================================================================
// Module: Mesh Suites Report Model
// Description: Outcomes and nested reports for cases, suites, and runs.
// Purpose: Provide the serializable result surface produced by the dispatcher.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`RunReport`] holds one [`SuiteReport`] per registered suite, in
//! registration order. Each suite report nests the [`CaseReport`]s its
//! harness produced, and case reports nest their subtests.
//!
//! Outcome severity for aggregation is `error > fail > pass > skip`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::identifiers::CaseName;
use crate::identifiers::SuiteName;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result classification for a case or suite.
///
/// # Invariants
/// - Variants are stable labels for reports and run events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// All assertions held.
    Pass,
    /// At least one assertion failed.
    Fail,
    /// A panic, timeout, or other unrecoverable error aborted execution.
    Error,
    /// Skipped explicitly or not selected.
    Skip,
}

impl Outcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
            Self::Skip => "skip",
        }
    }

    /// Returns true for outcomes that make a run unsuccessful.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Error)
    }

    /// Severity rank used for aggregation.
    const fn rank(self) -> u8 {
        match self {
            Self::Skip => 0,
            Self::Pass => 1,
            Self::Fail => 2,
            Self::Error => 3,
        }
    }

    /// Returns the more severe of two outcomes.
    #[must_use]
    pub const fn worst(self, other: Self) -> Self {
        if other.rank() > self.rank() { other } else { self }
    }

    /// Aggregates a lifecycle outcome with the outcomes of its children.
    ///
    /// A clean lifecycle with no children keeps its own outcome; a clean
    /// lifecycle whose children were all skipped is itself skipped.
    #[must_use]
    pub fn aggregate(lifecycle: Self, children: impl IntoIterator<Item = Self>) -> Self {
        let worst_child = children.into_iter().reduce(Self::worst);
        if lifecycle.is_failure() {
            return worst_child.map_or(lifecycle, |child| lifecycle.worst(child));
        }
        worst_child.unwrap_or(lifecycle)
    }
}

// ============================================================================
// SECTION: Case Reports
// ============================================================================

/// Report for one test case (or subtest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Case name (leaf name for subtests).
    pub name: CaseName,
    /// Final outcome.
    pub outcome: Outcome,
    /// Failure, error, and skip messages in the order they were recorded.
    pub messages: Vec<String>,
    /// Informational log lines.
    pub log: Vec<String>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Nested subtest reports.
    pub subcases: Vec<CaseReport>,
}

impl CaseReport {
    /// Returns true when this case failed or errored.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }

    /// Finds a direct subcase by name.
    #[must_use]
    pub fn subcase(&self, name: &str) -> Option<&Self> {
        self.subcases.iter().find(|case| case.name.as_str() == name)
    }
}

// ============================================================================
// SECTION: Suite Reports
// ============================================================================

/// Report for one registered suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Registered suite name.
    pub name: SuiteName,
    /// Aggregated outcome of the lifecycle and all cases.
    pub outcome: Outcome,
    /// Suite-level lifecycle messages (setup, teardown, timeouts).
    pub messages: Vec<String>,
    /// Suite-level log lines.
    pub log: Vec<String>,
    /// Case reports in execution order.
    pub cases: Vec<CaseReport>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Builds a report for a suite that was not executed.
    #[must_use]
    pub fn skipped(name: SuiteName, reason: impl Into<String>) -> Self {
        Self {
            name,
            outcome: Outcome::Skip,
            messages: vec![reason.into()],
            log: Vec::new(),
            cases: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Builds a report for a suite that failed outside of any test case.
    #[must_use]
    pub fn errored(name: SuiteName, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name,
            outcome: Outcome::Error,
            messages: vec![message.into()],
            log: Vec::new(),
            cases: Vec::new(),
            duration_ms: duration_millis(elapsed),
        }
    }

    /// Finds a case report by name.
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|case| case.name.as_str() == name)
    }

    /// Counts case outcomes (top-level cases only).
    #[must_use]
    pub fn case_counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(self.cases.iter().map(|case| case.outcome))
    }
}

// ============================================================================
// SECTION: Run Reports
// ============================================================================

/// Per-outcome totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Passed entries.
    pub passed: usize,
    /// Failed entries.
    pub failed: usize,
    /// Errored entries.
    pub errored: usize,
    /// Skipped entries.
    pub skipped: usize,
}

impl OutcomeCounts {
    /// Tallies a sequence of outcomes.
    #[must_use]
    pub fn tally(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Pass => counts.passed += 1,
                Outcome::Fail => counts.failed += 1,
                Outcome::Error => counts.errored += 1,
                Outcome::Skip => counts.skipped += 1,
            }
        }
        counts
    }

    /// Total number of tallied entries.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped
    }
}

/// Union of all suite reports for one dispatcher run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run start timestamp (milliseconds since epoch).
    pub started_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Suite reports in registration order.
    pub suites: Vec<SuiteReport>,
}

impl RunReport {
    /// Returns true when no suite failed or errored.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.suites.iter().any(|suite| suite.outcome.is_failure())
    }

    /// Process exit code for the run: `0` on success, `1` otherwise.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }

    /// Finds a suite report by name.
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&SuiteReport> {
        self.suites.iter().find(|suite| suite.name.as_str() == name)
    }

    /// Returns the suite names in report order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.suites.iter().map(|suite| suite.name.as_str()).collect()
    }

    /// Counts suite outcomes.
    #[must_use]
    pub fn suite_counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(self.suites.iter().map(|suite| suite.outcome))
    }

    /// Counts top-level case outcomes across all suites.
    #[must_use]
    pub fn case_counts(&self) -> OutcomeCounts {
        OutcomeCounts::tally(
            self.suites.iter().flat_map(|suite| suite.cases.iter().map(|case| case.outcome)),
        )
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
