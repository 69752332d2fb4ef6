//! Runner behaviour against small shell scripts standing in for the tool.
#![cfg(unix)]

use hubsh_core::{CihubRunner, CihubSources, SourceError, ToolProgram, WizardSources};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn script(dir: &Path, body: &str) -> ToolProgram {
    let path = dir.join("cihub.sh");
    std::fs::write(&path, body).unwrap();
    ToolProgram {
        program: "sh".into(),
        base_args: vec![path.display().to_string()],
    }
}

#[tokio::test]
async fn test_parses_envelope_and_passes_json_flag() {
    let dir = TempDir::new().unwrap();
    let program = script(
        dir.path(),
        r#"printf '{"command":"%s","status":"success","exit_code":0,"data":{"argv":"%s"}}' "$1" "$*""#,
    );
    let runner = CihubRunner::new(program, dir.path());

    let result = runner.run("check", &["--fast".to_string()], true).await.unwrap();
    assert_eq!(result.command.as_deref(), Some("check"));
    assert_eq!(result.exit_code, 0);
    assert_eq!(
        result.data_field("argv").and_then(|v| v.as_str()),
        Some("check --fast --json")
    );
}

#[tokio::test]
async fn test_empty_output_is_an_error() {
    let dir = TempDir::new().unwrap();
    let runner = CihubRunner::new(script(dir.path(), "exit 0"), dir.path());
    let err = runner.run("check", &[], true).await.unwrap_err();
    assert_eq!(err, SourceError::EmptyOutput);
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let runner = CihubRunner::new(script(dir.path(), "echo 'Traceback: boom'"), dir.path());
    let err = runner.run("check", &[], true).await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidJson(_)));
}

#[tokio::test]
async fn test_envelope_without_exit_code_is_rejected() {
    let dir = TempDir::new().unwrap();
    let runner = CihubRunner::new(script(dir.path(), r#"echo '{"status":"ok"}'"#), dir.path());
    let err = runner.run("check", &[], true).await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidJson(_)));
}

#[tokio::test]
async fn test_timeout() {
    let dir = TempDir::new().unwrap();
    let runner = CihubRunner::new(script(dir.path(), "sleep 5"), dir.path())
        .with_default_timeout(Duration::from_millis(100));
    let err = runner.run("profile", &[], true).await.unwrap_err();
    assert!(matches!(err, SourceError::Timeout { timeout_ms: 100, .. }));
}

#[tokio::test]
async fn test_missing_program_is_execution_error() {
    let dir = TempDir::new().unwrap();
    let program = ToolProgram {
        program: dir.path().join("does-not-exist"),
        base_args: Vec::new(),
    };
    let err = CihubRunner::new(program, dir.path())
        .run("check", &[], true)
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Execution { .. }));
}

#[tokio::test]
async fn test_sources_fall_back_to_builtin_profiles() {
    let dir = TempDir::new().unwrap();
    let runner = CihubRunner::new(script(dir.path(), "exit 1"), dir.path());
    let sources = CihubSources::new(runner);

    let names: Vec<String> = sources.list_profiles().await.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["python-strict", "python-minimal", "java-enterprise"]);

    let profile = sources.profile_config("python-minimal").await.unwrap().unwrap();
    assert!(profile.contains(&"python.tools.ruff".into()));
    assert!(sources.profile_config("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sources_read_existing_config() {
    let dir = TempDir::new().unwrap();
    let body = r#"
if [ "$3" = "--repo" ] && [ "$4" = "widgets" ]; then
  echo '{"exit_code":0,"data":{"config":{"language":"java"}}}'
else
  echo '{"exit_code":2,"summary":"Repo not found"}'
fi
"#;
    let sources = CihubSources::new(CihubRunner::new(script(dir.path(), body), dir.path()));

    let config = sources.existing_config("widgets").await.unwrap();
    assert_eq!(config.to_json(), serde_json::json!({"language": "java"}));

    let err = sources.existing_config("gadgets").await.unwrap_err();
    assert_eq!(err.to_string(), "CLI error: Repo not found (command: config show)");
}

#[tokio::test]
async fn test_sources_build_registry() {
    let dir = TempDir::new().unwrap();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/commands_list.json");
    let program = script(dir.path(), &format!("cat '{}'", fixture.display()));
    let sources = CihubSources::new(CihubRunner::new(program, dir.path()));

    let registry = sources.fetch_registry().await.unwrap();
    assert!(registry.exact_leaf("report build").is_some());
}
