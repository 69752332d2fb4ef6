//! Subprocess runner for the `cihub` tool.

use crate::error::SourceError;
use crate::parser::TOOL_NAME;
use hubsh_types::CommandResult;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default per-command timeout when nothing else applies.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

/// Commands known to run longer than the default.
const COMMAND_TIMEOUTS: &[(&str, u64)] = &[
    ("check", 180_000),
    ("ci", 300_000),
    ("report", 180_000),
    ("triage", 180_000),
    ("smoke", 180_000),
];

/// Timeout for a top-level subcommand, if it has its own.
pub fn command_timeout(command: &str) -> Option<Duration> {
    COMMAND_TIMEOUTS
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, ms)| Duration::from_millis(*ms))
}

/// How the tool is launched: a program plus any leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolProgram {
    pub program: PathBuf,
    pub base_args: Vec<String>,
}

impl ToolProgram {
    /// Bare `cihub` on `PATH`.
    pub fn on_path() -> Self {
        Self {
            program: PathBuf::from(TOOL_NAME),
            base_args: Vec::new(),
        }
    }

    /// `python -m cihub` with the given interpreter.
    pub fn python(interpreter: impl Into<PathBuf>) -> Self {
        Self {
            program: interpreter.into(),
            base_args: vec!["-m".to_string(), TOOL_NAME.to_string()],
        }
    }

    /// Resolve from the environment, then the configured interpreter.
    pub fn from_env(configured_python: Option<&str>) -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self::resolve(
            env("CIHUB_PATH").as_deref(),
            env("CIHUB_PYTHON_PATH").or_else(|| env("PYTHON_PATH")).as_deref(),
            configured_python,
        )
    }

    /// Explicit binary > interpreter from the environment > configured
    /// interpreter > `cihub` on `PATH`.
    pub fn resolve(
        explicit: Option<&str>,
        env_python: Option<&str>,
        configured_python: Option<&str>,
    ) -> Self {
        if let Some(binary) = explicit {
            return Self {
                program: PathBuf::from(binary),
                base_args: Vec::new(),
            };
        }
        match env_python.or(configured_python).filter(|p| !p.is_empty()) {
            Some(python) => Self::python(python),
            None => Self::on_path(),
        }
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.base_args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs tool subcommands and parses their JSON result envelope.
#[derive(Debug, Clone)]
pub struct CihubRunner {
    program: ToolProgram,
    cwd: PathBuf,
    default_timeout: Duration,
}

impl CihubRunner {
    pub fn new(program: ToolProgram, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program,
            cwd: cwd.into(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn program(&self) -> &ToolProgram {
        &self.program
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn timeout_for(&self, command: &str) -> Duration {
        command_timeout(command).unwrap_or(self.default_timeout)
    }

    /// Full argv after the program: base args, subcommand, arguments, and
    /// `--json` exactly once when requested.
    pub fn build_args(&self, command: &str, args: &[String], json: bool) -> Vec<String> {
        let mut argv: Vec<String> = self
            .program
            .base_args
            .iter()
            .cloned()
            .chain(std::iter::once(command.to_string()))
            .chain(args.iter().cloned())
            .collect();
        if json && !argv.iter().any(|arg| arg == "--json") {
            argv.push("--json".to_string());
        }
        argv
    }

    /// Run `command args...` and parse stdout as a [`CommandResult`].
    ///
    /// A non-zero exit status is not an error here; it is reported through
    /// the envelope's `exit_code`.
    pub async fn run(
        &self,
        command: &str,
        args: &[String],
        json: bool,
    ) -> Result<CommandResult, SourceError> {
        let argv = self.build_args(command, args, json);
        let cmdline = format!("{} {}", self.program.program.display(), argv.join(" "));
        let timeout = self.timeout_for(command);

        info!(target: "hubsh::runner", "Running {}", cmdline);
        debug!(
            target: "hubsh::runner",
            "cwd={:?} timeout={}ms",
            self.cwd,
            timeout.as_millis()
        );

        let mut cmd = tokio::process::Command::new(&self.program.program);
        cmd.args(&argv)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(target: "hubsh::runner", "Failed to spawn {}: {}", cmdline, e);
                return Err(SourceError::Execution {
                    command: cmdline,
                    message: e.to_string(),
                });
            }
            Err(_) => {
                warn!(
                    target: "hubsh::runner",
                    "{} timed out after {}ms",
                    cmdline,
                    timeout.as_millis()
                );
                return Err(SourceError::Timeout {
                    command: cmdline,
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!(target: "hubsh::runner", "stderr: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Err(SourceError::EmptyOutput);
        }

        let result: CommandResult =
            serde_json::from_str(stdout).map_err(|e| SourceError::InvalidJson(e.to_string()))?;
        debug!(
            target: "hubsh::runner",
            "{} exited with {:?}, envelope exit_code {}",
            command,
            output.status.code(),
            result.exit_code
        );
        Ok(result)
    }
}
