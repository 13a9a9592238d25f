// crates/mesh-suites-core/src/render.rs
// ============================================================================
// Module: Report Rendering
// Description: Human-readable and JSON renderings of a run report.
// Purpose: Print per-suite, per-case results the way test runners do.
// Dependencies: serde_json, crate::report
// ============================================================================

//! ## Overview
//! The text form mirrors familiar test-runner output: one `--- OUTCOME:`
//! line per suite with nested case lines, messages for anything that did
//! not pass, and a final `ok`/`FAIL` line. The markdown form is written as
//! a run artifact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use crate::report::CaseReport;
use crate::report::Outcome;
use crate::report::OutcomeCounts;
use crate::report::RunReport;
use crate::report::SuiteReport;

// ============================================================================
// SECTION: Text
// ============================================================================

/// Renders a run report as plain text.
///
/// With `verbose` set, log lines are printed for every case; otherwise only
/// for cases that did not pass.
#[must_use]
pub fn render_text(report: &RunReport, verbose: bool) -> String {
    let mut out = String::new();
    for suite in &report.suites {
        render_suite(&mut out, suite, verbose);
    }
    let suites = report.suite_counts();
    let cases = report.case_counts();
    let _ = writeln!(out, "suites: {}", counts_line(&suites));
    let _ = writeln!(out, "cases: {}", counts_line(&cases));
    let verdict = if report.is_success() { "ok" } else { "FAIL" };
    let _ = writeln!(out, "{verdict}\t{}", format_seconds(report.duration_ms));
    out
}

/// Renders one suite block.
fn render_suite(out: &mut String, suite: &SuiteReport, verbose: bool) {
    let _ = writeln!(
        out,
        "--- {}: {} ({})",
        outcome_label(suite.outcome),
        suite.name,
        format_seconds(suite.duration_ms)
    );
    if verbose || suite.outcome != Outcome::Pass {
        for line in &suite.log {
            let _ = writeln!(out, "    {line}");
        }
    }
    for message in &suite.messages {
        let _ = writeln!(out, "    {message}");
    }
    for case in &suite.cases {
        render_case(out, suite.name.as_str(), case, 1, verbose);
    }
}

/// Renders one case line and its nested subtests.
fn render_case(out: &mut String, parent: &str, case: &CaseReport, depth: usize, verbose: bool) {
    let indent = "    ".repeat(depth);
    let path = format!("{parent}/{}", case.name);
    let _ = writeln!(
        out,
        "{indent}--- {}: {path} ({})",
        outcome_label(case.outcome),
        format_seconds(case.duration_ms)
    );
    if verbose || case.outcome != Outcome::Pass {
        for line in &case.log {
            let _ = writeln!(out, "{indent}    {line}");
        }
    }
    for message in &case.messages {
        let _ = writeln!(out, "{indent}    {message}");
    }
    for sub in &case.subcases {
        render_case(out, &path, sub, depth + 1, verbose);
    }
}

// ============================================================================
// SECTION: Markdown
// ============================================================================

/// Renders a run report as a markdown summary.
#[must_use]
pub fn render_markdown(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("# Suite Run Summary\n\n");
    out.push_str("## Status\n\n");
    let status = if report.is_success() { "pass" } else { "fail" };
    let _ = writeln!(out, "- Status: {status}");
    let _ = writeln!(out, "- Duration (ms): {}", report.duration_ms);
    let _ = writeln!(out, "- Suites: {}", counts_line(&report.suite_counts()));
    let _ = writeln!(out, "- Cases: {}", counts_line(&report.case_counts()));
    out.push_str("\n## Suites\n\n");
    if report.suites.is_empty() {
        out.push_str("- None\n");
    } else {
        out.push_str("| Suite | Outcome | Cases | Duration (ms) |\n");
        out.push_str("|-------|---------|-------|---------------|\n");
        for suite in &report.suites {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                suite.name,
                suite.outcome.as_str(),
                counts_line(&suite.case_counts()),
                suite.duration_ms
            );
        }
    }
    out.push_str("\n## Failures\n\n");
    let mut any = false;
    for suite in report.suites.iter().filter(|suite| suite.outcome.is_failure()) {
        for message in &suite.messages {
            let _ = writeln!(out, "- {}: {message}", suite.name);
            any = true;
        }
        for case in &suite.cases {
            any |= markdown_case_failures(&mut out, suite.name.as_str(), case);
        }
    }
    if !any {
        out.push_str("- None\n");
    }
    out
}

/// Appends failure bullets for a case tree; returns true when any were written.
fn markdown_case_failures(out: &mut String, parent: &str, case: &CaseReport) -> bool {
    if !case.is_failure() {
        return false;
    }
    let path = format!("{parent}/{}", case.name);
    let mut wrote = false;
    for message in &case.messages {
        let _ = writeln!(out, "- {path}: {message}");
        wrote = true;
    }
    for sub in &case.subcases {
        wrote |= markdown_case_failures(out, &path, sub);
    }
    if !wrote {
        let _ = writeln!(out, "- {path}: {}", case.outcome.as_str());
        wrote = true;
    }
    wrote
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Upper-case outcome label used in text output.
const fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "PASS",
        Outcome::Fail => "FAIL",
        Outcome::Error => "ERROR",
        Outcome::Skip => "SKIP",
    }
}

/// Formats milliseconds as seconds with two decimals.
fn format_seconds(millis: u64) -> String {
    format!("{}.{:02}s", millis / 1000, (millis % 1000) / 10)
}

/// Formats outcome totals on one line.
fn counts_line(counts: &OutcomeCounts) -> String {
    format!(
        "{} passed, {} failed, {} errored, {} skipped",
        counts.passed, counts.failed, counts.errored, counts.skipped
    )
}
