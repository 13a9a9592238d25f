// crates/mesh-suites-core/src/artifacts.rs
// ============================================================================
// Module: Report Artifacts
// Description: On-disk artifacts for a finished run.
// Purpose: Write deterministic JSON and markdown summaries per run and suite.
// Dependencies: serde, serde_jcs, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ReportArtifacts`] owns a run root directory and writes:
//! - `report.json`: the whole run, canonical JCS serialization.
//! - `report.md`: markdown summary.
//! - `suites/<name>.json`: one canonical report per suite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::render::render_markdown;
use crate::report::RunReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while rendering or writing report artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Filesystem failure.
    #[error("report io error: {0}")]
    Io(String),
    /// Serialization failure.
    #[error("report serialization error: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Artifact writer rooted at one run directory.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    /// Root directory for this run.
    root: PathBuf,
}

impl ReportArtifacts {
    /// Creates the artifact root.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| ReportError::Io(err.to_string()))?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, ReportError> {
        let bytes =
            serde_jcs::to_vec(value).map_err(|err| ReportError::Serialize(err.to_string()))?;
        self.write_bytes(name, &bytes)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] when the write fails.
    pub fn write_text(&self, name: &str, value: &str) -> Result<PathBuf, ReportError> {
        self.write_bytes(name, value.as_bytes())
    }

    /// Writes the full set of run artifacts and returns their paths.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when any artifact cannot be written.
    pub fn write_report(&self, report: &RunReport) -> Result<Vec<PathBuf>, ReportError> {
        let mut written = vec![
            self.write_json("report.json", report)?,
            self.write_text("report.md", &render_markdown(report))?,
        ];
        let mut used = BTreeSet::new();
        for suite in &report.suites {
            let stem = unique_stem(artifact_file_stem(suite.name.as_str()), &mut used);
            written.push(self.write_json(&format!("suites/{stem}.json"), suite)?);
        }
        Ok(written)
    }

    /// Writes raw bytes below the root, creating parent directories.
    fn write_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| ReportError::Io(err.to_string()))?;
        }
        fs::write(&path, bytes).map_err(|err| ReportError::Io(err.to_string()))?;
        Ok(path)
    }
}

/// Renders a run report as pretty JSON.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] when serialization fails.
pub fn render_json(report: &RunReport) -> Result<String, ReportError> {
    serde_json::to_string_pretty(report).map_err(|err| ReportError::Serialize(err.to_string()))
}

/// Maps a suite name to a filesystem-safe file stem.
#[must_use]
pub fn artifact_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') { ch } else { '_' })
        .collect();
    if stem.is_empty() || stem.chars().all(|ch| ch == '.') { format!("_{stem}") } else { stem }
}

/// Returns `stem`, or the first free `stem_N`, ignoring ASCII case.
fn unique_stem(stem: String, used: &mut BTreeSet<String>) -> String {
    let mut candidate = stem.clone();
    let mut suffix = 2_u32;
    while !used.insert(candidate.to_ascii_lowercase()) {
        candidate = format!("{stem}_{suffix}");
        suffix = suffix.saturating_add(1);
    }
    candidate
}
