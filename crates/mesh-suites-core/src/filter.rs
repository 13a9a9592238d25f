// crates/mesh-suites-core/src/filter.rs
// ============================================================================
// Module: Suite Filter
// Description: Name-based selection of suites and cases.
// Purpose: Narrow a compiled-in registry to the suites and cases to run.
// Dependencies: crate::identifiers
// ============================================================================

//! ## Overview
//! A filter holds zero or more patterns of the form `suite` or
//! `suite/case`. An empty filter selects everything. Matching is substring
//! based by default and exact when requested.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::identifiers::CaseName;
use crate::identifiers::SuiteName;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One parsed filter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterPattern {
    /// Suite part of the pattern.
    suite: String,
    /// Optional case part of the pattern.
    case: Option<String>,
}

/// Selection of suites and cases by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuiteFilter {
    /// Parsed patterns; empty selects everything.
    patterns: Vec<FilterPattern>,
    /// Require exact name equality instead of substring matches.
    exact: bool,
}

impl SuiteFilter {
    /// Builds a filter from raw patterns. Blank patterns are ignored.
    #[must_use]
    pub fn new<I, P>(patterns: I, exact: bool) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|raw| {
                let trimmed = raw.as_ref().trim();
                if trimmed.is_empty() {
                    return None;
                }
                let (suite, case) = match trimmed.split_once('/') {
                    Some((suite, case)) if !case.trim().is_empty() => {
                        (suite.trim().to_string(), Some(case.trim().to_string()))
                    }
                    Some((suite, _)) => (suite.trim().to_string(), None),
                    None => (trimmed.to_string(), None),
                };
                Some(FilterPattern {
                    suite,
                    case,
                })
            })
            .collect();
        Self {
            patterns,
            exact,
        }
    }

    /// Returns true when the filter selects everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true when any case of the named suite may be selected.
    #[must_use]
    pub fn matches_suite(&self, suite: &SuiteName) -> bool {
        self.patterns.is_empty()
            || self.patterns.iter().any(|pattern| self.matches(&pattern.suite, suite.as_str()))
    }

    /// Returns true when the named case of the named suite is selected.
    #[must_use]
    pub fn matches_case(&self, suite: &SuiteName, case: &CaseName) -> bool {
        self.patterns.is_empty()
            || self.patterns.iter().any(|pattern| {
                self.matches(&pattern.suite, suite.as_str())
                    && pattern.case.as_ref().is_none_or(|wanted| self.matches(wanted, case.as_str()))
            })
    }

    /// Applies the configured match mode to a single name.
    fn matches(&self, pattern: &str, name: &str) -> bool {
        if self.exact { pattern == name } else { name.contains(pattern) }
    }
}
