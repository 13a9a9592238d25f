// crates/mesh-suites-script/src/runner.rs
// ============================================================================
// Module: Shell Step Runner
// Description: Executes manifest steps through a shell with timeouts and retries.
// Purpose: Turn shell exit statuses into case outcomes and captured logs.
// Dependencies: mesh-suites-core, nix, tempfile, thiserror
// ============================================================================

//! ## Overview
//! Each step runs as `<shell> -c <command>` in the step's working directory
//! with the merged manifest environment. Output is captured to anonymous
//! temporary files so a chatty step cannot block on a full pipe. On unix the
//! shell leads its own process group, and a step that outlives its timeout
//! or is cancelled has the whole group killed, background children
//! included. Failed attempts are retried up to the step's `retries` count;
//! only the final attempt decides the outcome.
//!
//! Setup and case steps stop when the case context is cancelled. Cleanup
//! steps ignore cancellation and are bounded by their own timeouts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use mesh_suites_core::CancellationToken;
use mesh_suites_core::CaseError;
use mesh_suites_core::CaseResult;
use mesh_suites_core::TestContext;
#[cfg(unix)]
use nix::sys::signal::Signal;
#[cfg(unix)]
use nix::sys::signal::killpg;
#[cfg(unix)]
use nix::unistd::Pid;
use thiserror::Error;

use crate::manifest::Step;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Interval between child status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Output lines kept per stream for logging.
const MAX_LOGGED_LINES: usize = 200;
/// Output lines included in a failure message.
const FAILURE_TAIL_LINES: usize = 20;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures to run a step at all (as opposed to a step exiting non-zero).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The shell could not be started.
    #[error("failed to spawn `{shell}` in {workdir}: {message}")]
    Spawn {
        /// Shell program.
        shell: String,
        /// Working directory.
        workdir: String,
        /// OS error text.
        message: String,
    },
    /// Output capture failed.
    #[error("output capture failed: {0}")]
    Capture(String),
    /// Waiting on the child failed.
    #[error("waiting for step failed: {0}")]
    Wait(String),
}

// ============================================================================
// SECTION: Step Results
// ============================================================================

/// How one step attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The process exited with a code.
    Exited(i32),
    /// The process was terminated by a signal.
    Signaled,
    /// The process exceeded its timeout and was killed.
    TimedOut(Duration),
    /// The run was cancelled and the process was killed.
    Cancelled,
}

impl StepStatus {
    /// Returns true for a zero exit code.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Maps a process exit status.
    fn from_exit(status: ExitStatus) -> Self {
        status.code().map_or(Self::Signaled, Self::Exited)
    }

    /// Human-readable description.
    fn describe(self) -> String {
        match self {
            Self::Exited(code) => format!("exit status {code}"),
            Self::Signaled => "terminated by signal".to_string(),
            Self::TimedOut(limit) => format!("timed out after {}s", limit.as_secs()),
            Self::Cancelled => "cancelled".to_string(),
        }
    }
}

/// Captured result of one step attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// How the attempt ended.
    pub status: StepStatus,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Working directory and environment shared by a list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepScope {
    /// Directory the shell starts in.
    pub workdir: PathBuf,
    /// Environment added on top of the inherited process environment.
    pub env: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs steps through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRunner {
    /// Shell program invoked as `<shell> -c <command>`.
    shell: String,
    /// Timeout for steps that do not set one.
    default_timeout: Duration,
}

impl ShellRunner {
    /// Creates a runner for the given shell and default step timeout.
    #[must_use]
    pub fn new(shell: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            shell: shell.into(),
            default_timeout,
        }
    }

    /// Returns the shell program.
    #[must_use]
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Runs one command once and captures its output.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] when the shell cannot be spawned or observed.
    /// A non-zero exit or a timeout is reported through [`StepOutput::status`].
    pub fn execute(
        &self,
        command: &str,
        scope: &StepScope,
        timeout: Duration,
    ) -> Result<StepOutput, ScriptError> {
        self.execute_until(command, scope, timeout, &CancellationToken::new())
    }

    /// Runs one command once, killing it early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError`] when the shell cannot be spawned or observed.
    /// Cancellation is reported as [`StepStatus::Cancelled`].
    pub fn execute_until(
        &self,
        command: &str,
        scope: &StepScope,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<StepOutput, ScriptError> {
        let mut stdout = tempfile::tempfile().map_err(|err| ScriptError::Capture(err.to_string()))?;
        let mut stderr = tempfile::tempfile().map_err(|err| ScriptError::Capture(err.to_string()))?;
        let stdout_handle = stdout.try_clone().map_err(|err| ScriptError::Capture(err.to_string()))?;
        let stderr_handle = stderr.try_clone().map_err(|err| ScriptError::Capture(err.to_string()))?;

        let mut shell = Command::new(&self.shell);
        shell
            .arg("-c")
            .arg(command)
            .current_dir(&scope.workdir)
            .envs(&scope.env)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_handle))
            .stderr(Stdio::from(stderr_handle));
        own_process_group(&mut shell);
        let mut child = shell.spawn().map_err(|err| ScriptError::Spawn {
            shell: self.shell.clone(),
            workdir: scope.workdir.display().to_string(),
            message: err.to_string(),
        })?;
        let status = wait_for_step(&mut child, timeout, cancel)?;
        Ok(StepOutput {
            status,
            stdout: read_capture(&mut stdout)?,
            stderr: read_capture(&mut stderr)?,
        })
    }

    /// Runs a step with its retry policy, logging output to `ctx`.
    ///
    /// Stops without further retries once the case is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CaseError::Failed`] when the final attempt does not succeed.
    pub fn run_step(&self, step: &Step, scope: &StepScope, ctx: &mut TestContext) -> CaseResult {
        let cancel = ctx.cancellation().clone();
        self.run_step_until(step, scope, ctx, &cancel)
    }

    /// Runs a step with its retry policy until it succeeds, fails, or
    /// `cancel` fires.
    fn run_step_until(
        &self,
        step: &Step,
        scope: &StepScope,
        ctx: &mut TestContext,
        cancel: &CancellationToken,
    ) -> CaseResult {
        let timeout = step.timeout().unwrap_or(self.default_timeout);
        let attempts = step.retries.saturating_add(1);
        let mut last_failure = String::new();
        for attempt in 1 ..= attempts {
            if cancel.is_cancelled() {
                return Err(CaseError::failed(format!("step `{}` cancelled", step.run)));
            }
            if attempts > 1 {
                ctx.log(format!("$ {} (attempt {attempt}/{attempts})", step.run));
            } else {
                ctx.log(format!("$ {}", step.run));
            }
            match self.execute_until(&step.run, scope, timeout, cancel) {
                Ok(output) => {
                    log_lines(ctx, &output.stdout);
                    log_lines(ctx, &output.stderr);
                    if output.status.success() {
                        return Ok(());
                    }
                    if output.status == StepStatus::Cancelled {
                        return Err(CaseError::failed(format!("step `{}` cancelled", step.run)));
                    }
                    last_failure = failure_summary(&output);
                }
                Err(err) => last_failure = err.to_string(),
            }
            if attempt < attempts {
                pause(step.retry_interval(), cancel);
            }
        }
        let noun = if attempts == 1 { "attempt" } else { "attempts" };
        Err(CaseError::failed(format!(
            "step `{}` failed after {attempts} {noun}: {last_failure}",
            step.run
        )))
    }

    /// Runs steps in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's [`CaseError`].
    pub fn run_steps(&self, steps: &[Step], scope: &StepScope, ctx: &mut TestContext) -> CaseResult {
        steps.iter().try_for_each(|step| self.run_step(step, scope, ctx))
    }

    /// Runs every step, recording failures without stopping.
    ///
    /// Cleanup runs to completion even after cancellation; each step is
    /// still bounded by its timeout.
    pub fn run_cleanup_steps(&self, steps: &[Step], scope: &StepScope, ctx: &mut TestContext) {
        let uncancelled = CancellationToken::new();
        for step in steps {
            if let Err(err) = self.run_step_until(step, scope, ctx, &uncancelled) {
                ctx.error(format!("cleanup {err}"));
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Polls the child until it exits, the timeout expires, or `cancel` fires.
fn wait_for_step(
    child: &mut Child,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<StepStatus, ScriptError> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(StepStatus::from_exit(status)),
            Ok(None) => {
                if cancel.is_cancelled() {
                    kill_step(child);
                    return Ok(StepStatus::Cancelled);
                }
                if started.elapsed() >= timeout {
                    kill_step(child);
                    return Ok(StepStatus::TimedOut(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                kill_step(child);
                return Err(ScriptError::Wait(err.to_string()));
            }
        }
    }
}

/// Sleeps for `interval`, returning early once `cancel` fires.
fn pause(interval: Duration, cancel: &CancellationToken) {
    let started = Instant::now();
    while started.elapsed() < interval && !cancel.is_cancelled() {
        thread::sleep(POLL_INTERVAL.min(interval.saturating_sub(started.elapsed())));
    }
}

/// Starts the shell as the leader of a new process group.
#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    command.process_group(0);
}

/// Process groups are unix-only; the shell keeps the parent's group.
#[cfg(not(unix))]
const fn own_process_group(_command: &mut Command) {}

/// Kills the step's process group, then the shell itself, and reaps it.
fn kill_step(child: &mut Child) {
    kill_process_group(child);
    let _ = child.kill();
    let _ = child.wait();
}

/// Sends `SIGKILL` to the process group led by the shell.
#[cfg(unix)]
fn kill_process_group(child: &Child) {
    if let Ok(pid) = i32::try_from(child.id()) {
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
}

/// Without process groups only the shell itself can be killed.
#[cfg(not(unix))]
const fn kill_process_group(_child: &Child) {}

/// Reads a capture file from the start.
fn read_capture(file: &mut File) -> Result<String, ScriptError> {
    file.seek(SeekFrom::Start(0)).map_err(|err| ScriptError::Capture(err.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|err| ScriptError::Capture(err.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Logs the tail of captured output.
fn log_lines(ctx: &mut TestContext, output: &str) {
    let lines: Vec<&str> = output.lines().collect();
    let skipped = lines.len().saturating_sub(MAX_LOGGED_LINES);
    if skipped > 0 {
        ctx.log(format!("... {skipped} earlier lines omitted"));
    }
    for line in &lines[skipped ..] {
        ctx.log(*line);
    }
}

/// Builds a failure message with the status and an output tail.
fn failure_summary(output: &StepOutput) -> String {
    let source = if output.stderr.trim().is_empty() { &output.stdout } else { &output.stderr };
    let lines: Vec<&str> = source.lines().collect();
    let tail = &lines[lines.len().saturating_sub(FAILURE_TAIL_LINES) ..];
    if tail.is_empty() {
        output.status.describe()
    } else {
        format!("{}\n{}", output.status.describe(), tail.join("\n"))
    }
}

/// Joins an optional relative directory onto a base directory.
#[must_use]
pub fn resolve_workdir(base: &Path, relative: Option<&str>) -> PathBuf {
    relative.map_or_else(|| base.to_path_buf(), |dir| base.join(dir))
}
