// crates/mesh-suites-core/src/lib.rs
// ============================================================================
// Module: Mesh Suites Core Library
// Description: Public API surface for suite registration and dispatch.
// Purpose: Expose the suite capability, harness, dispatcher, and reports.
// Dependencies: crate::{context, dispatcher, harness, registry, report, suite}
// ============================================================================

//! ## Overview
//! Mesh suites core runs a fixed list of named integration-test suites and
//! reports each one independently. A single entry point builds a
//! [`SuiteRegistry`], hands it to a [`Dispatcher`], and receives a
//! [`RunReport`] with one entry per registered name. Failures and panics
//! inside one suite never affect another.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifacts;
pub mod context;
pub mod dispatcher;
pub mod events;
pub mod filter;
pub mod harness;
pub mod identifiers;
pub mod registry;
pub mod render;
pub mod report;
pub mod suite;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use artifacts::ReportArtifacts;
pub use artifacts::ReportError;
pub use artifacts::render_json;
pub use context::CaseError;
pub use context::CaseResult;
pub use context::TestContext;
pub use dispatcher::DEFAULT_CANCEL_GRACE;
pub use dispatcher::DispatchError;
pub use dispatcher::DispatchOptions;
pub use dispatcher::Dispatcher;
pub use events::FileEventSink;
pub use events::MemoryEventSink;
pub use events::NoopEventSink;
pub use events::RunEvent;
pub use events::RunEventKind;
pub use events::RunEventSink;
pub use events::StderrEventSink;
pub use filter::SuiteFilter;
pub use harness::SuiteHarness;
pub use harness::run_suite;
pub use identifiers::CaseName;
pub use identifiers::SuiteName;
pub use registry::RegistryError;
pub use registry::SuiteRegistry;
pub use render::render_markdown;
pub use render::render_text;
pub use report::CaseReport;
pub use report::Outcome;
pub use report::OutcomeCounts;
pub use report::RunReport;
pub use report::SuiteReport;
pub use suite::RunnableSuite;
pub use suite::Suite;
pub use suite::TestCase;
pub use tokio_util::sync::CancellationToken;
