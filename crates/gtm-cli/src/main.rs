// crates/gtm-cli/src/main.rs
// ============================================================================
// Module: GTM CLI Entry Point
// Description: Command dispatcher for the GTM MCP server.
// Purpose: Start the server, list tools, and check configuration.
// Dependencies: clap, gtm-config, gtm-mcp, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The `gtm` binary serves the GTM MCP tool surface, prints the advertised
//! tool definitions, and validates configuration files. Errors are written to
//! stderr and map to exit code 1.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use gtm_config::GtmMcpConfig;
use gtm_config::ServerTransport;
use gtm_mcp::McpServer;
use gtm_mcp::tool_definitions;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "gtm", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the GTM MCP server.
    Serve(ConfigArgs),
    /// Print the tool definitions as JSON.
    Tools,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a config file and report the effective settings.
    Check(ConfigArgs),
}

/// Config path selection shared by commands.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to gtm-mcp.toml or `GTM_MCP_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// CLI error wrapper for user-facing failures.
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
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Tools => command_tools(),
        Commands::Config {
            command: ConfigCommand::Check(args),
        } => command_config_check(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(&args)?;
    let server = tokio::task::spawn_blocking(move || McpServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `tools` command.
fn command_tools() -> CliResult<ExitCode> {
    write_stdout_line(&render_tools()?).map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config check` command.
fn command_config_check(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    write_stdout_line(&config_summary(&config)).map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates configuration.
fn load_config(args: &ConfigArgs) -> CliResult<GtmMcpConfig> {
    GtmMcpConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Renders the tool definitions as pretty JSON.
fn render_tools() -> CliResult<String> {
    serde_json::to_string_pretty(&tool_definitions())
        .map_err(|err| CliError::new(format!("failed to render tools: {err}")))
}

/// Summarizes the effective configuration.
fn config_summary(config: &GtmMcpConfig) -> String {
    let mut lines = vec![
        "config ok".to_string(),
        format!("transport: {}", config.server.transport.as_str()),
    ];
    if let Ok(addr) = config.server.bind_addr()
        && config.server.transport == ServerTransport::Http
    {
        lines.push(format!("bind: {addr}"));
    }
    lines.push(format!(
        "account restriction: {}",
        config.account_restriction().unwrap_or("none")
    ));
    let audit = match (&config.audit.path, config.audit.enabled) {
        (_, false) => "disabled".to_string(),
        (Some(path), true) => format!("file {path}"),
        (None, true) => "stderr".to_string(),
    };
    lines.push(format!("audit: {audit}"));
    lines.join("\n")
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

/// Formats an output failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write {stream}: {error}"))
}

/// Reports an error and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
