//! The JSON envelope every `cihub ... --json` invocation prints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A problem or suggestion attached to a command result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Fields the shell does not interpret (`summary`, `action`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    /// Best human-readable text: `message`, then `summary`, then `action`.
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or_else(|| {
            ["summary", "action"]
                .iter()
                .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
        })
    }
}

/// Severity of a rendered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
}

/// Result envelope produced by the external tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub exit_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Map<String, Value>>,
    #[serde(default)]
    pub problems: Vec<Issue>,
    #[serde(default)]
    pub suggestions: Vec<Issue>,
    #[serde(default)]
    pub files_generated: Vec<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommandResult {
    /// Overall severity: explicit `ok`/`warning` status wins, else the exit code decides.
    pub fn severity(&self) -> Severity {
        match self.status.as_deref() {
            Some("warning") => Severity::Warning,
            Some("ok") => Severity::Ok,
            _ if self.exit_code == 0 => Severity::Ok,
            _ => Severity::Error,
        }
    }

    /// Look up a field inside `data`.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref()?.get(key)
    }

    /// `data` as a JSON value (an empty object when absent).
    pub fn data_value(&self) -> Value {
        Value::Object(self.data.clone().unwrap_or_default())
    }
}
