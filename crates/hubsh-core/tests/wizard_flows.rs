//! End-to-end wizard sessions over the real step catalogs.

use hubsh_core::wizard::build_catalog;
use hubsh_core::{
    fallback_profile, fallback_profile_names, Document, RunMetadata, SourceError, StepError,
    Transition, WizardResult, WizardSession, WizardSources,
};
use hubsh_types::WizardFlow;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves the built-in profiles and one known repository.
#[derive(Default)]
struct FakeSources {
    fail_profiles: bool,
    profile_calls: AtomicUsize,
}

impl WizardSources for FakeSources {
    async fn profile_config(&self, name: &str) -> Result<Option<Document>, SourceError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_profiles {
            return Err(SourceError::Missing("profile service down".to_string()));
        }
        Ok(fallback_profile(name))
    }

    async fn existing_config(&self, repo: &str) -> Result<Document, SourceError> {
        match repo {
            "widgets" => Ok(Document::from_json(json!({
                "repo": {"owner": "acme", "name": "widgets"},
                "language": "java",
                "java": {"tools": {"pitest": {"enabled": false}}}
            }))
            .unwrap()),
            other => Err(SourceError::Execution {
                command: "config show".to_string(),
                message: format!("unknown repo {other}"),
            }),
        }
    }
}

async fn answer(session: &mut WizardSession, sources: &FakeSources, line: &str) -> Transition {
    session.submit(line, sources).await.unwrap()
}

fn current_id(session: &WizardSession) -> &'static str {
    session.current_step().unwrap().id
}

/// Answers every remaining step with its default until completion.
async fn accept_defaults(session: &mut WizardSession, sources: &FakeSources) -> WizardResult {
    for _ in 0..100 {
        if let Transition::Completed(result) = answer(session, sources, "").await {
            return result;
        }
    }
    panic!("wizard did not complete");
}

fn get<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    doc.get_value(&path.into())
}

#[tokio::test]
async fn test_back_navigation_switches_language_branch() {
    let sources = FakeSources::default();
    let mut session = WizardSession::new(WizardFlow::Init, build_catalog(WizardFlow::Init, &[]));

    answer(&mut session, &sources, "").await; // repo path "."
    answer(&mut session, &sources, "acme").await;
    answer(&mut session, &sources, "widgets").await;
    answer(&mut session, &sources, "").await;
    answer(&mut session, &sources, "").await;
    assert_eq!(current_id(&session), "language");

    answer(&mut session, &sources, "java").await;
    assert_eq!(current_id(&session), "java.build_tool");

    assert_eq!(answer(&mut session, &sources, "/back").await, Transition::Back);
    assert_eq!(current_id(&session), "language");
    answer(&mut session, &sources, "python").await;
    assert_eq!(current_id(&session), "python.version");

    let result = accept_defaults(&mut session, &sources).await;
    assert_eq!(get(&result.config, "language"), Some(&json!("python")));
    assert_eq!(get(&result.config, "python.version"), Some(&json!("3.12")));
    assert_eq!(get(&result.config, "python.tools.ruff.enabled"), Some(&json!(true)));
    assert!(get(&result.config, "java.build_tool").is_none());
    assert_eq!(get(&result.config, "thresholds.coverage_min"), Some(&json!(80)));
    assert_eq!(result.meta.get_str("repoPath"), Some("."));
    assert_eq!(result.meta.get_bool("apply"), Some(true));
}

#[tokio::test]
async fn test_disabled_pitest_skips_multiplier() {
    let sources = FakeSources::default();
    let mut config = Document::new();
    config.set(&"language".into(), json!("java"));
    config.set(&"repo.owner".into(), json!("acme"));
    config.set(&"repo.name".into(), json!("svc"));
    let mut session = WizardSession::with_seed(
        WizardFlow::Init,
        build_catalog(WizardFlow::Init, &[]),
        config,
        RunMetadata::new(),
    );

    while current_id(&session) != "java.tools.pitest" {
        answer(&mut session, &sources, "").await;
    }
    answer(&mut session, &sources, "no").await;
    assert_eq!(current_id(&session), "java.tools.checkstyle");

    while current_id(&session) != "java.tools.owasp" {
        answer(&mut session, &sources, "").await;
    }
    answer(&mut session, &sources, "yes").await;
    assert_eq!(current_id(&session), "java.tools.owasp.timeout_seconds");

    let err = session.submit("30", &sources).await.unwrap_err();
    assert_eq!(err, StepError::Validation("Enter a whole number >= 60".to_string()));
    answer(&mut session, &sources, "900").await;

    let result = accept_defaults(&mut session, &sources).await;
    assert!(get(&result.config, "java.tools.pitest.timeout_multiplier").is_none());
    assert_eq!(get(&result.config, "java.tools.owasp.timeout_seconds"), Some(&json!(900)));
}

#[tokio::test]
async fn test_cancel_discards_documents() {
    let sources = FakeSources::default();
    let mut session = WizardSession::new(WizardFlow::Init, build_catalog(WizardFlow::Init, &[]));
    answer(&mut session, &sources, "../svc").await;
    answer(&mut session, &sources, "acme").await;

    assert_eq!(answer(&mut session, &sources, "/cancel").await, Transition::Cancelled);
    assert!(session.config().is_empty());
    assert!(session.meta().is_empty());
    assert!(session.current_step().is_none());
    assert_eq!(session.submit("x", &sources).await, Err(StepError::Closed));
}

#[tokio::test]
async fn test_profile_is_merged_into_config() {
    let sources = FakeSources::default();
    let profiles = fallback_profile_names();
    let mut session = WizardSession::new(WizardFlow::New, build_catalog(WizardFlow::New, &profiles));
    assert_eq!(current_id(&session), "meta.profile");

    // "python-strict" is choice 2 after "none".
    answer(&mut session, &sources, "2").await;
    assert_eq!(sources.profile_calls.load(Ordering::SeqCst), 1);
    assert_eq!(get(session.config(), "python.tools.mypy.enabled"), Some(&json!(true)));
    assert_eq!(session.meta().get_str("profileName"), Some("python-strict"));

    answer(&mut session, &sources, "acme").await;
    answer(&mut session, &sources, "widgets").await;
    let result = accept_defaults(&mut session, &sources).await;

    // Profile answers act as defaults; whole thresholds stay integers.
    assert_eq!(get(&result.config, "thresholds.coverage_min"), Some(&json!(90)));
    assert_eq!(get(&result.config, "thresholds.mutation_score_min"), Some(&json!(80)));
    assert_eq!(get(&result.config, "language"), Some(&json!("python")));

    let invocation = result.into_invocation().unwrap();
    assert_eq!(invocation.command, "new");
    assert_eq!(invocation.args[0], "acme/widgets");
}

#[tokio::test]
async fn test_none_profile_skips_fetch() {
    let sources = FakeSources::default();
    let profiles = fallback_profile_names();
    let mut session = WizardSession::new(WizardFlow::New, build_catalog(WizardFlow::New, &profiles));
    answer(&mut session, &sources, "").await;
    assert_eq!(sources.profile_calls.load(Ordering::SeqCst), 0);
    assert_eq!(current_id(&session), "repo.owner");
    assert!(session.config().is_empty());
}

#[tokio::test]
async fn test_profile_failure_keeps_prior_answers() {
    let sources = FakeSources {
        fail_profiles: true,
        ..Default::default()
    };
    let mut seed = Document::new();
    seed.set(&"repo.owner".into(), json!("acme"));
    let mut session = WizardSession::with_seed(
        WizardFlow::New,
        build_catalog(WizardFlow::New, &fallback_profile_names()),
        seed.clone(),
        RunMetadata::new(),
    );

    let err = session.submit("python-minimal", &sources).await.unwrap_err();
    assert_eq!(err, StepError::SideEffect("profile service down".to_string()));
    assert_eq!(session.config(), &seed);
    assert_eq!(current_id(&session), "meta.profile");
}

#[tokio::test]
async fn test_config_edit_replaces_document() {
    let sources = FakeSources::default();
    let mut seed = Document::new();
    seed.set(&"language".into(), json!("python"));
    let mut session = WizardSession::with_seed(
        WizardFlow::ConfigEdit,
        build_catalog(WizardFlow::ConfigEdit, &[]),
        seed,
        RunMetadata::new(),
    );

    let err = session.submit("gadgets", &sources).await.unwrap_err();
    assert!(matches!(err, StepError::SideEffect(_)));

    answer(&mut session, &sources, "widgets").await;
    assert_eq!(get(session.config(), "language"), Some(&json!("java")));
    assert_eq!(session.prompt().unwrap().default.as_deref(), Some("acme"));

    while current_id(&session) != "meta.apply" {
        answer(&mut session, &sources, "").await;
    }
    let Transition::Completed(result) = answer(&mut session, &sources, "n").await else {
        panic!("expected completion");
    };
    assert!(get(&result.config, "java.tools.pitest.timeout_multiplier").is_none());

    let invocation = result.into_invocation().unwrap();
    assert_eq!(invocation.command, "config");
    assert_eq!(&invocation.args[..3], ["edit", "--repo", "widgets"]);
    assert_eq!(invocation.args.last().map(String::as_str), Some("--dry-run"));
}
