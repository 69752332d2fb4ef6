//! Error types for hubsh.

use thiserror::Error;

/// Tokenizer failures. Always recoverable: the user is re-prompted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{reason}")]
    EmptyCommand { reason: &'static str },

    #[error("{reason}")]
    MalformedInput { reason: &'static str },
}

/// Registry construction failures. The registry is treated as unavailable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command registry missing from CLI output")]
    MissingPayload,

    #[error("Malformed command descriptor at index {0}")]
    MalformedDescriptor(usize),

    #[error("Command list fetch failed: {0}")]
    Fetch(String),
}

/// Failures of the external collaborators (tool subprocess).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("CLI error: {message} (command: {command})")]
    Execution { command: String, message: String },

    #[error("{command} timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("No JSON output from CLI")]
    EmptyOutput,

    #[error("Invalid JSON output from CLI: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    Missing(String),
}

/// A rejected wizard answer. The session is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// The raw answer did not parse for the current step.
    #[error("{0}")]
    Validation(String),

    /// A profile or configuration fetch triggered by the answer failed.
    #[error("{0}")]
    SideEffect(String),

    #[error("Wizard session is no longer active")]
    Closed,
}

/// Failures turning a finished wizard into a tool invocation.
#[derive(Error, Debug)]
pub enum HubshError {
    #[error("{0}")]
    Wizard(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
