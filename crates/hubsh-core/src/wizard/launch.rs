//! Detecting wizard-triggering commands and seeding sessions from their flags.

use super::catalog::meta_keys;
use super::RunMetadata;
use crate::document::Document;
use crate::resolver::Runnable;
use hubsh_types::WizardFlow;
use serde_json::Value;
use tracing::debug;

/// A wizard to start in place of running a command.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardLaunch {
    pub flow: WizardFlow,
    pub config: Document,
    pub meta: RunMetadata,
}

/// Value following `flag` in `args`, if any.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let index = args.iter().position(|arg| arg == flag)?;
    args.get(index + 1).map(String::as_str)
}

fn detect_flow(runnable: &Runnable) -> Option<(WizardFlow, Vec<String>)> {
    let invocation = runnable.invocation();
    match invocation.command.as_str() {
        "new" => Some((WizardFlow::New, invocation.args)),
        "init" => Some((WizardFlow::Init, invocation.args)),
        "config" if invocation.args.first().map(String::as_str) == Some("edit") => {
            Some((WizardFlow::ConfigEdit, invocation.args[1..].to_vec()))
        }
        _ => None,
    }
}

/// Decide whether `runnable` should open a wizard, and pre-fill it.
///
/// `new`, `init` and `config edit` are wizard triggers, whether matched
/// against the registry or typed free-form.
pub fn plan_launch(runnable: &Runnable) -> Option<WizardLaunch> {
    let (flow, args) = detect_flow(runnable)?;
    let config = seed_config(flow, &args);
    let meta = seed_meta(flow, &args);
    debug!(
        target: "hubsh::wizard",
        "'{}' opens the {} wizard ({} seeded config keys)",
        runnable.command,
        flow,
        config.len()
    );
    Some(WizardLaunch { flow, config, meta })
}

fn leading_positional(flow: WizardFlow, args: &[String]) -> Option<&str> {
    if flow != WizardFlow::New {
        return None;
    }
    args.first()
        .map(String::as_str)
        .filter(|arg| !arg.starts_with('-'))
}

fn seed_config(flow: WizardFlow, args: &[String]) -> Document {
    let mut config = Document::new();
    for (flag, path) in [
        ("--owner", "repo.owner"),
        ("--name", "repo.name"),
        ("--language", "language"),
    ] {
        if let Some(value) = flag_value(args, flag).filter(|v| !v.is_empty()) {
            config.set(&path.into(), Value::from(value));
        }
    }

    if let Some(repo) = leading_positional(flow, args) {
        let (owner, name) = match repo.split_once('/') {
            Some((owner, rest)) => (owner, rest.split('/').next().unwrap_or_default()),
            None => ("", repo),
        };
        if !owner.is_empty() {
            config.set(&"repo.owner".into(), Value::from(owner));
        }
        if !name.is_empty() {
            config.set(&"repo.name".into(), Value::from(name));
        }
    }
    config
}

fn seed_meta(flow: WizardFlow, args: &[String]) -> RunMetadata {
    let mut meta = RunMetadata::new();
    let has = |flag: &str| args.iter().any(|arg| arg == flag);
    if has("--dry-run") {
        meta.set(meta_keys::APPLY, false);
    } else if has("--apply") {
        meta.set(meta_keys::APPLY, true);
    }

    if let Some(profile) = flag_value(args, "--profile").filter(|v| !v.is_empty()) {
        meta.set(meta_keys::PROFILE_NAME, profile);
    }

    let repo = flag_value(args, "--repo").filter(|v| !v.is_empty());
    match (flow, repo) {
        (WizardFlow::Init, Some(path)) => meta.set(meta_keys::REPO_PATH, path),
        (WizardFlow::ConfigEdit, Some(name)) => meta.set(meta_keys::REPO_NAME, name),
        _ => {}
    }

    if let Some(repo) = leading_positional(flow, args) {
        meta.set(meta_keys::REPO_NAME, repo);
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Verification;
    use serde_json::json;

    fn unverified(command: &str, args: &[&str]) -> Runnable {
        Runnable {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            verification: Verification::Unverified,
        }
    }

    #[test]
    fn test_non_wizard_command() {
        assert!(plan_launch(&unverified("check", &[])).is_none());
        assert!(plan_launch(&unverified("config", &["show"])).is_none());
    }

    #[test]
    fn test_new_with_positional_repo() {
        let launch = plan_launch(&unverified("new", &["acme/widgets", "--dry-run"])).unwrap();
        assert_eq!(launch.flow, WizardFlow::New);
        assert_eq!(
            launch.config.to_json(),
            json!({"repo": {"owner": "acme", "name": "widgets"}})
        );
        assert_eq!(launch.meta.get_str("repoName"), Some("acme/widgets"));
        assert_eq!(launch.meta.get_bool("apply"), Some(false));
    }

    #[test]
    fn test_init_flags() {
        let launch = plan_launch(&unverified(
            "init",
            &["--repo", "../svc", "--language", "java", "--apply", "--profile", "java-enterprise"],
        ))
        .unwrap();
        assert_eq!(launch.flow, WizardFlow::Init);
        assert_eq!(launch.config.to_json(), json!({"language": "java"}));
        assert_eq!(launch.meta.get_str("repoPath"), Some("../svc"));
        assert_eq!(launch.meta.get_bool("apply"), Some(true));
        assert_eq!(launch.meta.get_str("profileName"), Some("java-enterprise"));
    }

    #[test]
    fn test_config_edit_drops_edit_token() {
        let launch = plan_launch(&unverified("config", &["edit", "--repo", "widgets"])).unwrap();
        assert_eq!(launch.flow, WizardFlow::ConfigEdit);
        assert_eq!(launch.meta.get_str("repoName"), Some("widgets"));
        assert!(launch.config.is_empty());
    }

    #[test]
    fn test_config_edit_from_canonical_command() {
        let launch = plan_launch(&unverified("config edit", &["--repo", "svc"])).unwrap();
        assert_eq!(launch.flow, WizardFlow::ConfigEdit);
        assert_eq!(launch.meta.get_str("repoName"), Some("svc"));
    }

    #[test]
    fn test_flag_value() {
        let args: Vec<String> = ["--owner", "acme", "--name"].iter().map(|s| s.to_string()).collect();
        assert_eq!(flag_value(&args, "--owner"), Some("acme"));
        assert_eq!(flag_value(&args, "--name"), None);
        assert_eq!(flag_value(&args, "--language"), None);
    }
}
