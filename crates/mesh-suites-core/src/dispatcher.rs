// crates/mesh-suites-core/src/dispatcher.rs
// ============================================================================
// Module: Suite Dispatcher
// Description: Runs registered suites independently and collects their reports.
// Purpose: Contain failures per suite and surface one report entry per name.
// Dependencies: tokio, tokio-util, thiserror, crate::{events, filter, harness, registry, report}
// ============================================================================

//! ## Overview
//! The dispatcher moves each suite onto a blocking worker and waits for its
//! report. A suite that panics outside the harness, or exceeds the
//! configured timeout, is reported as `error` without affecting any other
//! suite. Reports always come back in registration order.
//!
//! On timeout the suite's cancellation token is cancelled and the dispatcher
//! waits up to [`DispatchOptions::cancel_grace`] for the worker to return,
//! still holding its parallelism permit. Cases completed before the timeout
//! stay in the report. A worker that ignores cancellation past the grace
//! period is detached; the harness suppresses any events it still emits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::panic_message;
use crate::events::NoopEventSink;
use crate::events::RunEvent;
use crate::events::RunEventSink;
use crate::events::now_millis;
use crate::filter::SuiteFilter;
use crate::harness::SuiteHarness;
use crate::identifiers::SuiteName;
use crate::registry::RegisteredSuite;
use crate::registry::RegistryError;
use crate::registry::SuiteRegistry;
use crate::registry::validate_name;
use crate::report::Outcome;
use crate::report::RunReport;
use crate::report::SuiteReport;
use crate::report::duration_millis;
use crate::suite::RunnableSuite;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Dispatcher execution options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Suite and case selection.
    pub filter: SuiteFilter,
    /// Maximum number of suites running at once.
    pub parallelism: NonZeroUsize,
    /// Optional wall-clock limit per suite.
    pub suite_timeout: Option<Duration>,
    /// How long a timed-out suite may take to stop after cancellation.
    pub cancel_grace: Duration,
}

/// Default wait for a cancelled suite to return.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(10);

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            filter: SuiteFilter::default(),
            parallelism: NonZeroUsize::MIN,
            suite_timeout: None,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dispatcher failures raised before a suite runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The suite could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Runs named suites and accumulates their reports.
pub struct Dispatcher {
    /// Execution options.
    options: DispatchOptions,
    /// Destination for run events.
    events: Arc<dyn RunEventSink>,
    /// Reports produced by [`Dispatcher::register_and_run`].
    report: RunReport,
    /// Time of the first incremental run.
    started: Option<Instant>,
}

impl Dispatcher {
    /// Creates a dispatcher that discards run events.
    #[must_use]
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            options,
            events: Arc::new(NoopEventSink),
            report: RunReport::default(),
            started: None,
        }
    }

    /// Routes run events to the given sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the execution options.
    #[must_use]
    pub const fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Registers one suite and runs it immediately.
    ///
    /// The report is appended to this dispatcher's accumulated run report.
    /// The first call emits `run_started` without a suite count.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the name is blank or was already run
    /// by this dispatcher.
    pub async fn register_and_run<S>(
        &mut self,
        name: impl Into<SuiteName>,
        suite: S,
    ) -> Result<&SuiteReport, DispatchError>
    where
        S: RunnableSuite + 'static,
    {
        let name = name.into();
        validate_name(&name, self.report.suites.iter().map(|suite| &suite.name))?;
        let started = match self.started {
            Some(started) => started,
            None => {
                self.report.started_at_ms = now_millis();
                self.events.record(&RunEvent::run_started(None));
                *self.started.insert(Instant::now())
            }
        };
        let entry = RegisteredSuite {
            name,
            suite: Box::new(suite),
        };
        let report = execute(entry, &self.options, &self.events).await;
        let index = self.report.suites.len();
        self.report.suites.push(report);
        self.report.duration_ms = duration_millis(started.elapsed());
        Ok(&self.report.suites[index])
    }

    /// Returns the reports accumulated by [`Dispatcher::register_and_run`].
    #[must_use]
    pub const fn report(&self) -> &RunReport {
        &self.report
    }

    /// Consumes the dispatcher and returns the accumulated report.
    #[must_use]
    pub fn finish(self) -> RunReport {
        self.events.record(&RunEvent::run_finished(&self.report));
        self.report
    }

    /// Runs every suite of a registry and returns one report per suite.
    pub async fn run(&self, registry: SuiteRegistry) -> RunReport {
        let started = Instant::now();
        let started_at_ms = now_millis();
        let entries = registry.into_entries();
        self.events.record(&RunEvent::run_started(Some(entries.len())));

        let names: Vec<SuiteName> = entries.iter().map(|entry| entry.name.clone()).collect();
        let mut slots: Vec<Option<SuiteReport>> = vec![None; entries.len()];
        let semaphore = Arc::new(Semaphore::new(self.options.parallelism.get()));
        let mut tasks = JoinSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore).acquire_owned().await.ok();
            let options = self.options.clone();
            let events = Arc::clone(&self.events);
            tasks.spawn(async move {
                let _permit = permit;
                (index, execute(entry, &options, &events).await)
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, report)) = joined
                && let Some(slot) = slots.get_mut(index)
            {
                *slot = Some(report);
            }
        }

        let suites = names
            .into_iter()
            .zip(slots)
            .map(|(name, slot)| {
                slot.unwrap_or_else(|| {
                    SuiteReport::errored(name, "suite task aborted before reporting", Duration::ZERO)
                })
            })
            .collect();
        let report = RunReport {
            started_at_ms,
            duration_ms: duration_millis(started.elapsed()),
            suites,
        };
        self.events.record(&RunEvent::run_finished(&report));
        report
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs one suite on a blocking worker, honoring filter and timeout.
async fn execute(
    entry: RegisteredSuite,
    options: &DispatchOptions,
    events: &Arc<dyn RunEventSink>,
) -> SuiteReport {
    let RegisteredSuite {
        name,
        mut suite,
    } = entry;
    if !options.filter.matches_suite(&name) {
        let report = SuiteReport::skipped(name, "not selected by filter");
        events.record(&RunEvent::suite_finished(&report));
        return report;
    }

    let cancel = CancellationToken::new();
    let harness = SuiteHarness::new(name.clone(), options.filter.clone(), Arc::clone(events))
        .with_cancellation(cancel.clone());
    let started = Instant::now();
    let mut handle = tokio::task::spawn_blocking(move || suite.run(&harness));
    let joined = match options.suite_timeout {
        Some(limit) => {
            let waited = tokio::time::timeout(limit, &mut handle).await;
            if let Ok(joined) = waited {
                joined
            } else {
                cancel.cancel();
                let report =
                    stop_timed_out(name, handle, limit, options.cancel_grace, started).await;
                events.record(&RunEvent::suite_finished(&report));
                return report;
            }
        }
        None => handle.await,
    };
    match joined {
        Ok(report) => report,
        Err(err) => {
            let message = if err.is_panic() {
                let payload = err.into_panic();
                format!("suite panicked outside the harness: {}", panic_message(payload.as_ref()))
            } else {
                "suite worker was cancelled".to_string()
            };
            let report = SuiteReport::errored(name, message, started.elapsed());
            events.record(&RunEvent::suite_finished(&report));
            report
        }
    }
}

/// Waits for a cancelled worker and builds the timed-out suite report.
async fn stop_timed_out(
    name: SuiteName,
    handle: JoinHandle<SuiteReport>,
    limit: Duration,
    grace: Duration,
    started: Instant,
) -> SuiteReport {
    let mut messages = vec![format!("suite exceeded timeout of {}ms", limit.as_millis())];
    let mut log = Vec::new();
    let mut cases = Vec::new();
    match tokio::time::timeout(grace, handle).await {
        Ok(Ok(partial)) => {
            messages.extend(partial.messages);
            log = partial.log;
            cases = partial.cases;
        }
        Ok(Err(err)) if err.is_panic() => {
            let payload = err.into_panic();
            messages.push(format!(
                "suite panicked after cancellation: {}",
                panic_message(payload.as_ref())
            ));
        }
        Ok(Err(_)) => {}
        Err(_) => messages.push(format!(
            "suite did not stop within {}ms after cancellation",
            grace.as_millis()
        )),
    }
    SuiteReport {
        name,
        outcome: Outcome::Error,
        messages,
        log,
        cases,
        duration_ms: duration_millis(started.elapsed()),
    }
}
