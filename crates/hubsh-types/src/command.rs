//! Types for the remote command list advertised by `cihub commands list`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One flag accepted by a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOption {
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
}

/// A remote command (or command group) as advertised by the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Token path, e.g. `["report", "build"]`
    #[serde(default)]
    pub path: Vec<String>,
    /// Canonical space-joined form of `path`
    #[serde(default)]
    pub command: String,
    /// One-line description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_json: Option<bool>,
    /// Overrides `supports_json` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_json_runtime: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_wizard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_interactive: Option<bool>,
    /// Namespace with subcommands but no direct action
    #[serde(default)]
    pub is_group: bool,
}

impl CommandDescriptor {
    /// Build a runnable descriptor from its token path.
    pub fn leaf<S: AsRef<str>>(path: &[S]) -> Self {
        let path: Vec<String> = path.iter().map(|s| s.as_ref().to_string()).collect();
        Self {
            command: path.join(" "),
            path,
            ..Self::default()
        }
    }

    /// Build a group descriptor from its token path.
    pub fn group<S: AsRef<str>>(path: &[S]) -> Self {
        Self {
            is_group: true,
            ..Self::leaf(path)
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Fill in whichever of `path` / `command` is missing from the other.
    ///
    /// Returns `None` when both are empty.
    pub fn normalized(mut self) -> Option<Self> {
        if self.path.is_empty() {
            self.path = self.command.split_whitespace().map(String::from).collect();
        }
        if self.command.trim().is_empty() {
            self.command = self.path.join(" ");
        }
        if self.path.is_empty() {
            return None;
        }
        Some(self)
    }

    /// Whether the command can emit JSON when invoked from the shell.
    pub fn json_at_runtime(&self) -> bool {
        self.supports_json_runtime
            .or(self.supports_json)
            .unwrap_or(true)
    }

    /// Whether the command has an interactive mode of its own.
    pub fn interactive(&self) -> bool {
        self.supports_interactive
            .or(self.supports_wizard)
            .unwrap_or(false)
    }

    /// First path token, used to group help listings.
    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or(&self.command)
    }
}

/// Payload carried in the `data` field of `cihub commands list --json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandsPayload {
    pub commands: Vec<CommandDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wizard: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_version: Option<String>,
}

impl CommandsPayload {
    /// Extract the payload from a result's `data` object.
    ///
    /// Returns `None` unless `commands` is an array of descriptor-shaped objects.
    pub fn from_data(data: &Value) -> Option<Self> {
        let object = data.as_object()?;
        if !object.get("commands")?.is_array() {
            return None;
        }
        serde_json::from_value(data.clone()).ok()
    }
}

/// Shell-local actions that never reach the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaCommand {
    Help,
    Clear,
    Exit,
}

impl MetaCommand {
    pub const ALL: [MetaCommand; 3] = [MetaCommand::Help, MetaCommand::Clear, MetaCommand::Exit];

    pub fn name(self) -> &'static str {
        match self {
            MetaCommand::Help => "help",
            MetaCommand::Clear => "clear",
            MetaCommand::Exit => "exit",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MetaCommand::Help => "Show help",
            MetaCommand::Clear => "Clear current output",
            MetaCommand::Exit => "Exit the interactive CLI",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|meta| meta.name() == name)
    }
}

impl std::fmt::Display for MetaCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// A titled two-column listing of commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HelpTable {
    pub const HEADERS: [&'static str; 2] = ["Command", "Description"];

    pub fn new(title: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.into(),
            headers: Self::HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    /// The fixed table of meta commands.
    pub fn meta() -> Self {
        let rows = MetaCommand::ALL
            .iter()
            .map(|meta| vec![meta.to_string(), meta.description().to_string()])
            .collect();
        Self::new("Meta commands", rows)
    }
}
