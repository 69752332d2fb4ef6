//! hubsh - interactive shell for the cihub CLI.

use anyhow::{Context, Result};
use clap::Parser;
use hubsh::{config, logging, repl, state};
use hubsh_core::{CihubRunner, CihubSources, ToolProgram};
use std::path::PathBuf;
use tokio::io::BufReader;

use config::Config;
use logging::{LogConfig, LogFormat};
use repl::Shell;
use state::ShellState;

/// hubsh - slash commands and configuration wizards on top of cihub.
#[derive(Parser, Debug)]
#[command(name = "hubsh")]
#[command(about = "Interactive shell for the cihub CLI")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory commands run in (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Enable verbose logging (INFO level for hubsh targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (TRACE level for everything)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "wizard=debug" or "runner=trace")
    /// Can be specified multiple times. Targets are prefixed with "hubsh::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine working directory")?,
    };

    // Config first: it can turn on verbose logging and disable color.
    let loaded = Config::load(&cwd, cli.config.as_deref());
    let config = loaded.config;

    let log_config = LogConfig::from_cli(
        cli.verbose || config.cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    )
    .with_ansi(config.ui.color);
    logging::init(&log_config);

    for rejected in &log_config.rejected {
        tracing::warn!(target: "hubsh::startup", "Ignoring log override '{}'", rejected);
    }
    for warning in &loaded.warnings {
        tracing::warn!(target: "hubsh::config", "{}", warning);
    }
    for source in loaded.sources.iter().filter(|s| s.loaded) {
        tracing::debug!(target: "hubsh::config", "Using {} config {:?}", source.label, source.path);
    }

    let program = ToolProgram::from_env(config.cli.python_path.as_deref());
    tracing::info!(
        target: "hubsh::startup",
        "Using '{}' in {:?} (default timeout {}ms)",
        program.display(),
        cwd,
        config.cli.default_timeout_ms
    );

    let runner = CihubRunner::new(program, cwd.clone()).with_default_timeout(config.default_timeout());
    let state = ShellState::new(config, CihubSources::new(runner));

    let shell = Shell::new(state, std::io::stdout());
    shell.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
