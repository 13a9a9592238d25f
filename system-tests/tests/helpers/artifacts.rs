// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Artifacts
// Description: Artifact helpers for system-tests.
// Purpose: Create per-test run roots and write deterministic summaries.
// Dependencies: system-tests, mesh-suites-core, serde
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use mesh_suites_core::ReportArtifacts;
use mesh_suites_core::RunReport;
use mesh_suites_core::events::now_millis;
use serde::Serialize;
use system_tests::config::SystemTestConfig;

/// Summary written as `summary.json` for every test.
#[derive(Debug, Serialize)]
struct TestSummary {
    /// Test function name.
    test_name: String,
    /// Final status label.
    status: String,
    /// Start timestamp (milliseconds since epoch).
    started_at_ms: u64,
    /// End timestamp (milliseconds since epoch).
    ended_at_ms: u64,
    /// Wall-clock duration in milliseconds.
    duration_ms: u64,
    /// Free-form notes.
    notes: Vec<String>,
    /// Artifact paths relative to the run root.
    artifacts: Vec<String>,
}

/// Default run root under `target/system-tests`.
fn default_run_root(test_name: &str) -> PathBuf {
    let stamp = now_millis();
    PathBuf::from("target/system-tests").join(format!("run_{stamp}")).join(test_name)
}

/// Returns true when `path` is a directory with at least one entry.
fn is_non_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

/// Artifact manager for a single system-test.
#[derive(Clone)]
pub struct TestArtifacts {
    /// Writer rooted at the test's run root.
    writer: ReportArtifacts,
}

impl TestArtifacts {
    /// Creates the artifact root for a test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = config
            .run_root
            .map_or_else(|| default_run_root(test_name), |root| root.join(test_name));
        if is_non_empty_dir(&root) && !config.allow_overwrite {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("run root {} is not empty", root.display()),
            ));
        }
        fs::create_dir_all(&root)?;
        let writer = ReportArtifacts::new(root).map_err(|err| io::Error::other(err.to_string()))?;
        Ok(Self {
            writer,
        })
    }

    /// Returns the root directory for the test artifacts.
    pub fn root(&self) -> &Path {
        self.writer.root()
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        self.writer.write_json(name, value).map_err(|err| io::Error::other(err.to_string()))
    }

    /// Writes a text artifact with UTF-8 encoding.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        self.writer.write_text(name, value).map_err(|err| io::Error::other(err.to_string()))
    }

    /// Writes `report.json`, `report.md`, and per-suite reports.
    pub fn write_run_report(&self, report: &RunReport) -> io::Result<Vec<PathBuf>> {
        self.writer.write_report(report).map_err(|err| io::Error::other(err.to_string()))
    }
}

/// Helper that writes summaries even when a test panics.
pub struct TestReporter {
    /// Artifact manager for the test.
    artifacts: TestArtifacts,
    /// Test function name.
    test_name: String,
    /// Start timestamp (milliseconds since epoch).
    started_at_ms: u64,
    /// Whether a summary has been written.
    finalized: bool,
}

impl TestReporter {
    /// Creates a reporter for the named test.
    pub fn new(test_name: &str) -> io::Result<Self> {
        Ok(Self {
            artifacts: TestArtifacts::new(test_name)?,
            test_name: test_name.to_string(),
            started_at_ms: now_millis(),
            finalized: false,
        })
    }

    /// Returns the artifact manager.
    pub fn artifacts(&self) -> &TestArtifacts {
        &self.artifacts
    }

    /// Writes the final summary for the test.
    pub fn finish(
        &mut self,
        status: &str,
        notes: Vec<String>,
        artifacts: Vec<String>,
    ) -> io::Result<()> {
        let ended_at_ms = now_millis();
        let summary = TestSummary {
            test_name: self.test_name.clone(),
            status: status.to_string(),
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes,
            artifacts,
        };
        self.artifacts.write_json("summary.json", &summary)?;
        self.artifacts.write_text("summary.md", &summary_markdown(&summary))?;
        self.finalized = true;
        Ok(())
    }

    /// Writes the run report artifacts and a summary derived from the report.
    pub fn finish_with_report(&mut self, report: &RunReport) -> io::Result<()> {
        let written = self.artifacts.write_run_report(report)?;
        let root = self.artifacts.root().to_path_buf();
        let mut listed: Vec<String> = written
            .iter()
            .map(|path| path.strip_prefix(&root).unwrap_or(path).display().to_string())
            .collect();
        listed.push("summary.json".to_string());
        listed.push("summary.md".to_string());
        let suites = report.suite_counts();
        let cases = report.case_counts();
        let notes = vec![
            format!(
                "suites: {} passed, {} failed, {} errored, {} skipped",
                suites.passed, suites.failed, suites.errored, suites.skipped
            ),
            format!(
                "cases: {} passed, {} failed, {} errored, {} skipped",
                cases.passed, cases.failed, cases.errored, cases.skipped
            ),
        ];
        let status = if report.is_success() { "pass" } else { "fail" };
        self.finish(status, notes, listed)
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let status = if std::thread::panicking() { "panic" } else { "unknown" };
        let _ = self.finish(
            status,
            vec!["test terminated without explicit summary".to_string()],
            Vec::new(),
        );
    }
}

/// Renders the summary as Markdown.
fn summary_markdown(summary: &TestSummary) -> String {
    let mut out = String::new();
    out.push_str("# System-Test Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Test: {}", summary.test_name);
    let _ = writeln!(out, "- Status: {}", summary.status);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Notes\n\n");
    if summary.notes.is_empty() {
        out.push_str("- None\n");
    } else {
        for note in &summary.notes {
            let _ = writeln!(out, "- {note}");
        }
    }
    out.push_str("\n## Artifacts\n\n");
    if summary.artifacts.is_empty() {
        out.push_str("- None\n");
    } else {
        for artifact in &summary.artifacts {
            let _ = writeln!(out, "- {artifact}");
        }
    }
    out
}
