//! Wizard step definitions and answer parsing.

use super::activation::Activation;
use crate::document::DocPath;
use crate::error::StepError;
use serde_json::Value;

/// Which document an answer is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepScope {
    /// The nested configuration document.
    Config,
    /// The flat run-metadata document.
    Meta,
}

/// Expected answer shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Text,
    Select,
    Confirm,
}

/// Engine-level action run after an answer is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEffect {
    /// Fetch the chosen profile and merge it into the configuration.
    ApplyProfile,
    /// Fetch the named repository's configuration and use it as the document.
    LoadExistingConfig,
}

/// Typed conversion for free-text answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueParser {
    /// A whole number, optionally bounded below.
    Integer { min: Option<i64> },
    /// Any finite number; whole numbers stay integers.
    Number,
}

impl ValueParser {
    pub fn parse(&self, raw: &str) -> Result<Value, String> {
        let raw = raw.trim();
        match *self {
            ValueParser::Integer { min } => {
                let message = match min {
                    Some(min) => format!("Enter a whole number >= {min}"),
                    None => "Enter a valid integer".to_string(),
                };
                let parsed: i64 = raw.parse().map_err(|_| message.clone())?;
                match min {
                    Some(min) if parsed < min => Err(message),
                    _ => Ok(Value::from(parsed)),
                }
            }
            ValueParser::Number => match raw.parse::<i64>() {
                Ok(whole) => Ok(Value::from(whole)),
                Err(_) => raw
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .and_then(|n| serde_json::Number::from_f64(n).map(Value::Number))
                    .ok_or_else(|| "Enter a valid number".to_string()),
            },
        }
    }
}

/// One question in a wizard catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardStep {
    /// Unique within a catalog.
    pub id: &'static str,
    pub question: &'static str,
    pub scope: StepScope,
    pub kind: StepKind,
    /// Storage path; metadata steps use a single segment.
    pub key: DocPath,
    /// Non-empty for `Select` steps.
    pub choices: Vec<String>,
    pub default: Option<Value>,
    pub activation: Activation,
    pub parser: Option<ValueParser>,
    pub effect: Option<StepEffect>,
}

impl WizardStep {
    fn base(id: &'static str, question: &'static str, kind: StepKind, key: &str) -> Self {
        Self {
            id,
            question,
            scope: StepScope::Config,
            kind,
            key: DocPath::parse(key),
            choices: Vec::new(),
            default: None,
            activation: Activation::Always,
            parser: None,
            effect: None,
        }
    }

    pub fn text(id: &'static str, question: &'static str, key: &str) -> Self {
        Self::base(id, question, StepKind::Text, key)
    }

    pub fn confirm(id: &'static str, question: &'static str, key: &str, default: bool) -> Self {
        Self::base(id, question, StepKind::Confirm, key).with_default(default)
    }

    pub fn select<S: AsRef<str>>(
        id: &'static str,
        question: &'static str,
        key: &str,
        choices: &[S],
    ) -> Self {
        Self {
            choices: choices.iter().map(|c| c.as_ref().to_string()).collect(),
            ..Self::base(id, question, StepKind::Select, key)
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn in_metadata(mut self) -> Self {
        self.scope = StepScope::Meta;
        self
    }

    pub fn when(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn parse_with(mut self, parser: ValueParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_effect(mut self, effect: StepEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Turn a raw answer into the value to store.
    ///
    /// `fallback` is used when the answer is empty: the value already stored
    /// for this step, else the step default.
    pub fn resolve_answer(&self, input: &str, fallback: Option<&Value>) -> Result<Value, StepError> {
        let input = input.trim();
        match self.kind {
            StepKind::Confirm => {
                parse_confirm(input, fallback.and_then(Value::as_bool))
                    .map(Value::Bool)
                    .ok_or_else(|| StepError::Validation("Enter yes or no".to_string()))
            }
            StepKind::Select => {
                let fallback = fallback.and_then(value_text);
                parse_select(input, &self.choices, fallback.as_deref())
                    .map(Value::String)
                    .ok_or_else(|| {
                        StepError::Validation(format!("Choose one of: {}", self.choices.join(", ")))
                    })
            }
            StepKind::Text => {
                let resolved = if input.is_empty() {
                    fallback.and_then(value_text).unwrap_or_default()
                } else {
                    input.to_string()
                };
                if resolved.is_empty() {
                    return Err(StepError::Validation("Value is required".to_string()));
                }
                match &self.parser {
                    Some(parser) => parser.parse(&resolved).map_err(StepError::Validation),
                    None => Ok(Value::String(resolved)),
                }
            }
        }
    }
}

/// Render a stored or default value for display and text fallback.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Display form of a default: booleans read as yes/no.
pub fn display_default(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
        other => value_text(other),
    }
}

fn parse_confirm(input: &str, fallback: Option<bool>) -> Option<bool> {
    if input.is_empty() {
        return fallback;
    }
    match input.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_select(input: &str, choices: &[String], fallback: Option<&str>) -> Option<String> {
    if input.is_empty() {
        return fallback.filter(|f| !f.is_empty()).map(String::from);
    }
    if let Ok(index) = input.parse::<usize>() {
        if (1..=choices.len()).contains(&index) {
            return Some(choices[index - 1].clone());
        }
    }
    let lowered = input.to_lowercase();
    choices
        .iter()
        .find(|choice| choice.to_lowercase() == lowered)
        .cloned()
}
