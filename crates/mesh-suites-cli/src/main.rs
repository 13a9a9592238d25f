// crates/mesh-suites-cli/src/main.rs
// ============================================================================
// Module: Mesh Suites CLI Entry Point
// Description: Command dispatcher for listing and running compiled-in suites.
// Purpose: Load configuration, dispatch suites, and report their outcomes.
// Dependencies: clap, mesh-suites-cli, mesh-suites-config, mesh-suites-core, thiserror, tokio
// ============================================================================

//! ## Overview
//! `mesh-suites` builds the registry for a suite group, runs it through the
//! dispatcher, and prints the report. Exit codes: `0` when every suite
//! passed or skipped, `1` when any case or suite failed or errored, `2` for
//! usage and configuration errors.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mesh_suites_cli::SuiteGroup;
use mesh_suites_cli::build_registry;
use mesh_suites_cli::dispatch_options;
use mesh_suites_cli::script_options;
use mesh_suites_config::EventSinkKind;
use mesh_suites_config::EventsConfig;
use mesh_suites_config::MeshSuitesConfig;
use mesh_suites_core::Dispatcher;
use mesh_suites_core::FileEventSink;
use mesh_suites_core::NoopEventSink;
use mesh_suites_core::ReportArtifacts;
use mesh_suites_core::RunEventSink;
use mesh_suites_core::RunReport;
use mesh_suites_core::StderrEventSink;
use mesh_suites_core::render_json;
use mesh_suites_core::render_markdown;
use mesh_suites_core::render_text;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exit code for usage and configuration errors.
const USAGE_EXIT_CODE: u8 = 2;
/// Time granted to suite workers still running when the process exits.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "mesh-suites", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the suite names of a group, one per line.
    List(ListCommand),
    /// Run a suite group and report per-suite outcomes.
    Run(RunCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Suite group to list.
    #[arg(long, value_enum, default_value_t = SuiteGroup::All)]
    group: SuiteGroup,
}

/// Arguments for `run`.
#[derive(Args, Debug, Default)]
struct RunCommand {
    /// Suite group to run.
    #[arg(long, value_enum, default_value_t = SuiteGroup::All)]
    group: SuiteGroup,
    /// Optional config file path (defaults to mesh-suites.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run only suites (`suite`) or cases (`suite/case`) matching a pattern.
    #[arg(long = "filter", value_name = "PATTERN")]
    filter: Vec<String>,
    /// Match filter patterns exactly instead of by substring.
    #[arg(long, action = ArgAction::SetTrue)]
    exact: bool,
    /// Maximum number of suites running at once.
    #[arg(long, value_name = "N")]
    parallelism: Option<usize>,
    /// Per-suite wall-clock limit in seconds.
    #[arg(long = "timeout-secs", value_name = "N")]
    timeout_secs: Option<u64>,
    /// Write report artifacts to this directory.
    #[arg(long = "report-dir", value_name = "DIR")]
    report_dir: Option<String>,
    /// Report format printed to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Print log lines for passing cases too.
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file and its environment overrides.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to mesh-suites.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Report output formats.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Go-test-like text summary.
    #[default]
    Text,
    /// Pretty JSON report.
    Json,
    /// Markdown summary.
    Markdown,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::List(command) => command_list(&command),
        Commands::Run(command) => command_run(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

// ============================================================================
// SECTION: List Command
// ============================================================================

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    for name in command.group.names() {
        write_stdout_line(name).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let mut config = MeshSuitesConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    apply_run_overrides(&mut config, command);
    config.validate().map_err(|err| CliError::new(format!("invalid options: {err}")))?;

    let registry = build_registry(command.group, &script_options(&config.scripts))
        .map_err(|err| CliError::new(format!("failed to build suite registry: {err}")))?;
    let dispatcher =
        Dispatcher::new(dispatch_options(&config.run)).with_events(event_sink(&config.events)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::new(format!("failed to start runtime: {err}")))?;
    let report = runtime.block_on(dispatcher.run(registry));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    write_report(&report, command.format, command.verbose)?;
    if config.artifacts.enabled {
        let artifacts = ReportArtifacts::new(config.artifacts.root.as_str())
            .map_err(|err| CliError::new(format!("failed to write report artifacts: {err}")))?;
        let written = artifacts
            .write_report(&report)
            .map_err(|err| CliError::new(format!("failed to write report artifacts: {err}")))?;
        write_stderr_line(&format!(
            "wrote {} report artifacts to {}",
            written.len(),
            artifacts.root().display()
        ))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(ExitCode::from(report.exit_code()))
}

/// Applies command-line flags over the loaded configuration.
fn apply_run_overrides(config: &mut MeshSuitesConfig, command: &RunCommand) {
    if !command.filter.is_empty() {
        config.run.filter.clone_from(&command.filter);
    }
    if command.exact {
        config.run.exact = true;
    }
    if let Some(parallelism) = command.parallelism {
        config.run.parallelism = parallelism;
    }
    if let Some(timeout_secs) = command.timeout_secs {
        config.run.suite_timeout_secs = Some(timeout_secs);
    }
    if let Some(report_dir) = &command.report_dir {
        config.artifacts.enabled = true;
        config.artifacts.root.clone_from(report_dir);
    }
}

/// Opens the configured run event sink.
fn event_sink(events: &EventsConfig) -> CliResult<Arc<dyn RunEventSink>> {
    match events.sink {
        EventSinkKind::Stderr => Ok(Arc::new(StderrEventSink)),
        EventSinkKind::None => Ok(Arc::new(NoopEventSink)),
        EventSinkKind::File => {
            let path = events.path.as_deref().ok_or_else(|| {
                CliError::new("events.path is required for the file sink".to_string())
            })?;
            let sink = FileEventSink::new(Path::new(path)).map_err(|err| {
                CliError::new(format!("failed to open event log {path}: {err}"))
            })?;
            Ok(Arc::new(sink))
        }
    }
}

/// Prints the report in the requested format.
fn write_report(report: &RunReport, format: OutputFormat, verbose: bool) -> CliResult<()> {
    let rendered = match format {
        OutputFormat::Text => render_text(report, verbose),
        OutputFormat::Markdown => render_markdown(report),
        OutputFormat::Json => {
            let mut json = render_json(report)
                .map_err(|err| CliError::new(format!("failed to render report: {err}")))?;
            json.push('\n');
            json
        }
    };
    write_stdout(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = MeshSuitesConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let source = config
        .source
        .as_deref()
        .map_or_else(|| "defaults".to_string(), |path| path.display().to_string());
    write_stdout_line(&format!("config ok ({source})"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes text to stdout without adding a newline.
fn write_stdout(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(message.as_bytes())?;
    stdout.flush()
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns the usage exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(USAGE_EXIT_CODE)
}
