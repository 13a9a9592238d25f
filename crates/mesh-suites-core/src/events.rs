// crates/mesh-suites-core/src/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured progress events emitted while suites run.
// Purpose: Emit JSON-line run logs without hard dependencies on a logger.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Run events describe dispatcher progress: run start, each suite start and
//! finish, each case finish, and run completion. Sinks decide where events
//! go; the stderr and file sinks write one JSON object per line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::identifiers::SuiteName;
use crate::report::CaseReport;
use crate::report::Outcome;
use crate::report::OutcomeCounts;
use crate::report::RunReport;
use crate::report::SuiteReport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEventKind {
    /// The dispatcher started a run.
    RunStarted {
        /// Number of registered suites; absent for incremental runs, whose
        /// size is unknown when the first suite starts.
        #[serde(skip_serializing_if = "Option::is_none")]
        suite_count: Option<usize>,
    },
    /// A suite started executing.
    SuiteStarted {
        /// Suite name.
        suite: SuiteName,
    },
    /// A case finished executing.
    CaseFinished {
        /// Suite name.
        suite: SuiteName,
        /// Case name.
        case: String,
        /// Case outcome.
        outcome: Outcome,
        /// Case duration in milliseconds.
        duration_ms: u64,
    },
    /// A suite finished (or was skipped or timed out).
    SuiteFinished {
        /// Suite name.
        suite: SuiteName,
        /// Suite outcome.
        outcome: Outcome,
        /// Suite duration in milliseconds.
        duration_ms: u64,
        /// Case outcome totals.
        cases: OutcomeCounts,
    },
    /// The dispatcher finished a run.
    RunFinished {
        /// Suite outcome totals.
        suites: OutcomeCounts,
        /// Whether the run succeeded.
        success: bool,
        /// Run duration in milliseconds.
        duration_ms: u64,
    },
}

/// Run event with a consistent timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunEvent {
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u64,
    /// Event payload, flattened into the JSON object.
    #[serde(flatten)]
    pub kind: RunEventKind,
}

impl RunEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(kind: RunEventKind) -> Self {
        Self {
            timestamp_ms: now_millis(),
            kind,
        }
    }

    /// Builds a `run_started` event.
    #[must_use]
    pub fn run_started(suite_count: Option<usize>) -> Self {
        Self::new(RunEventKind::RunStarted {
            suite_count,
        })
    }

    /// Builds a `suite_started` event.
    #[must_use]
    pub fn suite_started(suite: &SuiteName) -> Self {
        Self::new(RunEventKind::SuiteStarted {
            suite: suite.clone(),
        })
    }

    /// Builds a `case_finished` event.
    #[must_use]
    pub fn case_finished(suite: &SuiteName, case: &CaseReport) -> Self {
        Self::new(RunEventKind::CaseFinished {
            suite: suite.clone(),
            case: case.name.to_string(),
            outcome: case.outcome,
            duration_ms: case.duration_ms,
        })
    }

    /// Builds a `suite_finished` event.
    #[must_use]
    pub fn suite_finished(report: &SuiteReport) -> Self {
        Self::new(RunEventKind::SuiteFinished {
            suite: report.name.clone(),
            outcome: report.outcome,
            duration_ms: report.duration_ms,
            cases: report.case_counts(),
        })
    }

    /// Builds a `run_finished` event.
    #[must_use]
    pub fn run_finished(report: &RunReport) -> Self {
        Self::new(RunEventKind::RunFinished {
            suites: report.suite_counts(),
            success: report.is_success(),
            duration_ms: report.duration_ms,
        })
    }
}

/// Milliseconds since the Unix epoch, saturating.
#[must_use]
pub fn now_millis() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for run events.
pub trait RunEventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &RunEvent);
}

/// Sink that discards events.
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn record(&self, _event: &RunEvent) {}
}

/// Sink that logs JSON lines to stderr.
pub struct StderrEventSink;

impl RunEventSink for StderrEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileEventSink {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RunEventSink for FileEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps events in memory.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl RunEventSink for MemoryEventSink {
    fn record(&self, event: &RunEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
