//! Configuration profiles and the built-in fallback table.

use crate::document::Document;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A named configuration fragment as listed by `profile list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl ProfileSummary {
    fn builtin(name: &str, description: &str, config: Value) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            kind: None,
            language: config.get("language").and_then(Value::as_str).map(String::from),
            config: Some(config),
        }
    }
}

/// Used when the tool cannot list or show profiles.
pub static FALLBACK_PROFILES: Lazy<Vec<ProfileSummary>> = Lazy::new(|| {
    vec![
        ProfileSummary::builtin(
            "python-strict",
            "Strict Python config: full linting, typing, mutation testing",
            json!({
                "language": "python",
                "python": {
                    "version": "3.12",
                    "tools": {
                        "pytest": {"enabled": true},
                        "ruff": {"enabled": true},
                        "black": {"enabled": true},
                        "isort": {"enabled": true},
                        "mypy": {"enabled": true},
                        "bandit": {"enabled": true},
                        "pip_audit": {"enabled": true},
                        "mutmut": {"enabled": true},
                        "trivy": {"enabled": true}
                    }
                },
                "thresholds": {"coverage_min": 90, "mutation_score_min": 80}
            }),
        ),
        ProfileSummary::builtin(
            "python-minimal",
            "Minimal Python config: basic tests and linting",
            json!({
                "language": "python",
                "python": {
                    "version": "3.12",
                    "tools": {
                        "pytest": {"enabled": true},
                        "ruff": {"enabled": true}
                    }
                },
                "thresholds": {"coverage_min": 60}
            }),
        ),
        ProfileSummary::builtin(
            "java-enterprise",
            "Enterprise Java: full security suite, strict coverage",
            json!({
                "language": "java",
                "java": {
                    "build_tool": "maven",
                    "version": "17",
                    "tools": {
                        "junit": {"enabled": true},
                        "jacoco": {"enabled": true},
                        "checkstyle": {"enabled": true},
                        "spotbugs": {"enabled": true},
                        "owasp": {"enabled": true}
                    }
                },
                "security": {"gitleaks": {"enabled": true}},
                "thresholds": {"coverage_min": 85, "max_critical_vulns": 0}
            }),
        ),
    ]
});

/// Built-in configuration fragment for `name`.
pub fn fallback_profile(name: &str) -> Option<Document> {
    FALLBACK_PROFILES
        .iter()
        .find(|profile| profile.name == name)
        .and_then(|profile| profile.config.clone())
        .and_then(Document::from_json)
}

/// Names offered by the new-repo wizard when nothing better is known.
pub fn fallback_profile_names() -> Vec<String> {
    FALLBACK_PROFILES.iter().map(|p| p.name.clone()).collect()
}
