//! Conditional multi-step configuration wizard.

mod activation;
mod catalog;
mod engine;
mod launch;
mod step;

pub use activation::Activation;
pub use catalog::{base_config_steps, build_catalog, meta_keys, NO_PROFILE};
pub use engine::{active_steps, StepPrompt, Transition, WizardInput, WizardSession, WizardStatus};
pub use launch::{flag_value, plan_launch, WizardLaunch};
pub use step::{
    display_default, value_text, StepEffect, StepKind, StepScope, ValueParser, WizardStep,
};

use crate::document::Document;
use crate::error::HubshError;
use crate::resolver::Invocation;
use hubsh_types::WizardFlow;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat side-channel of answers that never enter the configuration
/// (target path, apply flag, chosen profile).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunMetadata(BTreeMap<String, Value>);

impl RunMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Non-empty string value for `key`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Everything a completed session hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardResult {
    pub flow: WizardFlow,
    pub config: Document,
    pub meta: RunMetadata,
}

impl WizardResult {
    /// Tool invocation equivalent to the answers given.
    pub fn into_invocation(self) -> crate::Result<Invocation> {
        let json = serde_json::to_string(&self.config)?;
        let dry_run = self.meta.get_bool(meta_keys::APPLY) == Some(false);

        let invocation = match self.flow {
            WizardFlow::New => {
                let name = self.repo_name().ok_or_else(|| {
                    HubshError::Wizard("Repo name is required for new".to_string())
                })?;
                let mut args = vec![name, "--config-json".to_string(), json, "--yes".to_string()];
                if dry_run {
                    args.push("--dry-run".to_string());
                }
                Invocation::new("new", args)
            }
            WizardFlow::Init => {
                let path = self.meta.get_str(meta_keys::REPO_PATH).unwrap_or(".");
                let mode = if dry_run { "--dry-run" } else { "--apply" };
                Invocation::new(
                    "init",
                    vec![
                        "--repo".to_string(),
                        path.to_string(),
                        "--config-json".to_string(),
                        json,
                        mode.to_string(),
                    ],
                )
            }
            WizardFlow::ConfigEdit => {
                let name = self
                    .meta
                    .get_str(meta_keys::REPO_NAME)
                    .ok_or_else(|| HubshError::Wizard("Repo name is required".to_string()))?;
                let mut args = vec![
                    "edit".to_string(),
                    "--repo".to_string(),
                    name.to_string(),
                    "--config-json".to_string(),
                    json,
                ];
                if dry_run {
                    args.push("--dry-run".to_string());
                }
                Invocation::new("config", args)
            }
        };
        Ok(invocation)
    }

    /// `repoName` metadata, else `owner/name` from the configuration, else
    /// the bare name.
    fn repo_name(&self) -> Option<String> {
        if let Some(name) = self.meta.get_str(meta_keys::REPO_NAME) {
            return Some(name.to_string());
        }
        let text = |path: &str| {
            self.config
                .get_value(&path.into())
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        match (text("repo.owner"), text("repo.name")) {
            (Some(owner), Some(name)) => Some(format!("{owner}/{name}")),
            (_, name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(flow: WizardFlow, config: Value, meta: &[(&str, Value)]) -> WizardResult {
        let mut run_meta = RunMetadata::new();
        for (key, value) in meta {
            run_meta.set(*key, value.clone());
        }
        WizardResult {
            flow,
            config: Document::from_json(config).unwrap(),
            meta: run_meta,
        }
    }

    #[test]
    fn test_new_invocation_uses_owner_and_name() {
        let invocation = result(
            WizardFlow::New,
            json!({"repo": {"owner": "acme", "name": "widgets"}}),
            &[("apply", json!(false))],
        )
        .into_invocation()
        .unwrap();

        assert_eq!(invocation.command, "new");
        assert_eq!(invocation.args[0], "acme/widgets");
        assert_eq!(invocation.args[1], "--config-json");
        assert_eq!(invocation.args[2], r#"{"repo":{"name":"widgets","owner":"acme"}}"#);
        assert_eq!(&invocation.args[3..], ["--yes", "--dry-run"]);
    }

    #[test]
    fn test_new_prefers_metadata_name() {
        let invocation = result(
            WizardFlow::New,
            json!({"repo": {"owner": "acme", "name": "widgets"}}),
            &[("repoName", json!("other/thing")), ("apply", json!(true))],
        )
        .into_invocation()
        .unwrap();
        assert_eq!(invocation.args[0], "other/thing");
        assert_eq!(invocation.args.last().map(String::as_str), Some("--yes"));
    }

    #[test]
    fn test_new_without_name_fails() {
        let err = result(WizardFlow::New, json!({}), &[]).into_invocation();
        assert!(matches!(err, Err(HubshError::Wizard(_))));
    }

    #[test]
    fn test_init_invocation() {
        let invocation = result(WizardFlow::Init, json!({"language": "java"}), &[])
            .into_invocation()
            .unwrap();
        assert_eq!(invocation.command, "init");
        assert_eq!(invocation.args[..2], ["--repo", "."]);
        assert_eq!(invocation.args.last().map(String::as_str), Some("--apply"));
    }

    #[test]
    fn test_config_edit_invocation() {
        let invocation = result(
            WizardFlow::ConfigEdit,
            json!({}),
            &[("repoName", json!("widgets")), ("apply", json!(false))],
        )
        .into_invocation()
        .unwrap();
        assert_eq!(invocation.command, "config");
        assert_eq!(
            invocation.args,
            vec!["edit", "--repo", "widgets", "--config-json", "{}", "--dry-run"]
        );
    }

    #[test]
    fn test_metadata_accessors() {
        let mut meta = RunMetadata::new();
        meta.set("repoPath", "");
        meta.set("apply", true);
        assert_eq!(meta.get_str("repoPath"), None);
        assert_eq!(meta.get_bool("apply"), Some(true));
        meta.clear();
        assert!(meta.is_empty());
    }
}
