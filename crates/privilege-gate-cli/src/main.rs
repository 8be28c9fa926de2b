// crates/privilege-gate-cli/src/main.rs
// ============================================================================
// Module: Privilege Gate CLI Entry Point
// Description: Command dispatcher for config validation and offline evaluation.
// Purpose: Evaluate role privileges against catalog snapshots from the shell.
// Dependencies: clap, privilege-gate-config, privilege-gate-core, serde, tracing
// ============================================================================

//! ## Overview
//! The Privilege Gate CLI validates role configuration files and evaluates a
//! single authorization request against a JSON catalog snapshot. Evaluation
//! results and error classifications are written to stdout as JSON; logs go
//! to stderr and are filtered through `RUST_LOG`.
//!
//! Exit codes: `0` when the verdict allows the action, `1` otherwise.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use privilege_gate_config::PrivilegeGateConfig;
use privilege_gate_config::load_catalog_snapshot;
use privilege_gate_core::AuthorizationService;
use privilege_gate_core::ComponentSelector;
use privilege_gate_core::EvaluationError;
use privilege_gate_core::IndicesOptions;
use privilege_gate_core::PrivilegesEvaluator;
use privilege_gate_core::ResourceRequest;
use privilege_gate_core::RoleName;
use privilege_gate_core::ServiceError;
use privilege_gate_core::WildcardExpansion;
use privilege_gate_core::runtime::StaticCatalogProvider;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Log filter applied when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "privilege-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Evaluate one request against a catalog snapshot.
    Evaluate(EvaluateCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Privilege Gate configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to privilege-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `evaluate`.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Optional config file path (defaults to privilege-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON catalog snapshot path.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Role carried by the caller; repeatable.
    #[arg(long = "role", value_name = "NAME", action = ArgAction::Append)]
    roles: Vec<String>,
    /// Action name, for example `indices:data/read/search`.
    #[arg(long, value_name = "ACTION")]
    action: String,
    /// Resource expression, for example `logs-*,-logs-old::failures`.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    expression: String,
    /// Request-level component selector.
    #[arg(long, value_enum, default_value_t = ComponentArg::Data)]
    component: ComponentArg,
    /// Wildcard expansion mode.
    #[arg(long, value_enum, default_value_t = ExpandArg::Open)]
    expand: ExpandArg,
    /// Skip missing literal names instead of failing.
    #[arg(long, action = ArgAction::SetTrue)]
    ignore_unavailable: bool,
    /// Report not found when nothing resolves.
    #[arg(long, action = ArgAction::SetTrue)]
    no_allow_empty: bool,
}

/// Component selector argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentArg {
    /// Main data component.
    Data,
    /// Failure-store component.
    Failures,
    /// Both components.
    All,
}

impl From<ComponentArg> for ComponentSelector {
    fn from(value: ComponentArg) -> Self {
        match value {
            ComponentArg::Data => Self::Data,
            ComponentArg::Failures => Self::Failures,
            ComponentArg::All => Self::All,
        }
    }
}

/// Wildcard expansion argument.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ExpandArg {
    /// Wildcards match nothing.
    None,
    /// Wildcards match visible resources.
    Open,
    /// Wildcards match hidden and system resources too.
    All,
}

impl From<ExpandArg> for WildcardExpansion {
    fn from(value: ExpandArg) -> Self {
        match value {
            ExpandArg::None => Self::None,
            ExpandArg::Open => Self::Open,
            ExpandArg::All => Self::All,
        }
    }
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Classification of a request that produced no verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ErrorClass {
    /// Literal names are missing.
    NotFound,
    /// The request is malformed.
    RequestShape,
    /// A snapshot could not be produced.
    Provider,
}

/// JSON error report written to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ErrorReport {
    /// Error classification.
    error: ErrorClass,
    /// Human-readable detail.
    message: String,
    /// Missing names for not-found errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    names: Vec<String>,
}

impl From<&ServiceError> for ErrorReport {
    fn from(error: &ServiceError) -> Self {
        let (class, names) = match error {
            ServiceError::Provider(_) => (ErrorClass::Provider, Vec::new()),
            ServiceError::Evaluation(EvaluationError::NotFound {
                names,
            }) => (ErrorClass::NotFound, names.clone()),
            ServiceError::Evaluation(EvaluationError::RequestShape(_)) => {
                (ErrorClass::RequestShape, Vec::new())
            }
        };
        Self {
            error: class,
            message: error.to_string(),
            names,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for failures outside evaluation.
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
    init_tracing();
    match cli.command {
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Evaluate(command) => command_evaluate(&command),
    }
}

/// Installs the stderr log subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = PrivilegeGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let registry = config
        .role_registry()
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line(&format!("config valid: {} roles", registry.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Evaluate Command
// ============================================================================

/// Executes the evaluate command.
fn command_evaluate(command: &EvaluateCommand) -> CliResult<ExitCode> {
    let config = PrivilegeGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let settings = config
        .evaluator_settings()
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let registry = config
        .role_registry()
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let catalog = load_catalog_snapshot(&command.catalog)
        .map_err(|err| CliError::new(format!("failed to load catalog: {err}")))?;
    debug!(roles = registry.len(), catalog = %command.catalog.display(), "inputs loaded");

    let service = AuthorizationService::new(
        StaticCatalogProvider::new(catalog),
        registry,
        PrivilegesEvaluator::new(settings),
    );
    let role_names: Vec<RoleName> =
        command.roles.iter().map(|name| RoleName::new(name.as_str())).collect();
    let outcome = build_request(command)
        .and_then(|request| service.authorize(&role_names, &request));

    match outcome {
        Ok(evaluation) => {
            write_json(&evaluation)?;
            Ok(exit_code(evaluation.verdict.is_allowed()))
        }
        Err(error) => {
            write_json(&ErrorReport::from(&error))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Builds the request from command arguments.
fn build_request(command: &EvaluateCommand) -> Result<ResourceRequest, ServiceError> {
    let request = ResourceRequest::new(command.action.as_str(), &command.expression)
        .map_err(EvaluationError::from)?;
    Ok(request.with_component(command.component.into()).with_options(IndicesOptions {
        expand_wildcards: command.expand.into(),
        ignore_unavailable: command.ignore_unavailable,
        allow_no_indices: !command.no_allow_empty,
    }))
}

/// Maps an allowed flag to the process exit code.
fn exit_code(allowed: bool) -> ExitCode {
    if allowed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a pretty JSON document to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
