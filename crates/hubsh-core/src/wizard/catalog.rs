//! Step catalogs for each wizard flow.

use super::activation::Activation;
use super::step::{StepEffect, ValueParser, WizardStep};
use hubsh_types::WizardFlow;

/// Metadata keys written by the lead-in and trailing steps.
pub mod meta_keys {
    pub const PROFILE_NAME: &str = "profileName";
    pub const REPO_PATH: &str = "repoPath";
    pub const REPO_NAME: &str = "repoName";
    pub const APPLY: &str = "apply";
}

/// Choice meaning "no profile".
pub const NO_PROFILE: &str = "none";

fn python(id: &'static str, question: &'static str, key: &str, default: bool) -> WizardStep {
    WizardStep::confirm(id, question, key, default).when(Activation::equals("language", "python"))
}

fn java(id: &'static str, question: &'static str, key: &str, default: bool) -> WizardStep {
    WizardStep::confirm(id, question, key, default).when(Activation::equals("language", "java"))
}

/// Configuration questions shared by every flow.
pub fn base_config_steps() -> Vec<WizardStep> {
    vec![
        WizardStep::text("repo.owner", "Repo owner (org/user):", "repo.owner"),
        WizardStep::text("repo.name", "Repo name:", "repo.name"),
        WizardStep::confirm("repo.use_central", "Use central runner?", "repo.use_central_runner", true),
        WizardStep::confirm(
            "repo.repo_side",
            "Enable repo-side execution?",
            "repo.repo_side_execution",
            false,
        ),
        WizardStep::select("language", "Select language:", "language", &["java", "python"]),
        WizardStep::select(
            "python.version",
            "Python version:",
            "python.version",
            &["3.12", "3.11", "3.10", "3.9"],
        )
        .with_default("3.12")
        .when(Activation::equals("language", "python")),
        python("python.tools.pytest", "Enable pytest?", "python.tools.pytest.enabled", true),
        python("python.tools.ruff", "Enable ruff (linter)?", "python.tools.ruff.enabled", true),
        python("python.tools.black", "Enable black (formatter)?", "python.tools.black.enabled", true),
        python("python.tools.isort", "Enable isort (import sorter)?", "python.tools.isort.enabled", false),
        python("python.tools.mypy", "Enable mypy (type checker)?", "python.tools.mypy.enabled", false),
        python("python.tools.bandit", "Enable bandit (security)?", "python.tools.bandit.enabled", true),
        python(
            "python.tools.pip_audit",
            "Enable pip-audit (dependency audit)?",
            "python.tools.pip_audit.enabled",
            true,
        ),
        python(
            "python.tools.mutmut",
            "Enable mutmut (mutation testing)?",
            "python.tools.mutmut.enabled",
            false,
        ),
        python(
            "python.tools.hypothesis",
            "Enable hypothesis (property testing)?",
            "python.tools.hypothesis.enabled",
            false,
        ),
        python("python.tools.semgrep", "Enable semgrep (SAST)?", "python.tools.semgrep.enabled", false),
        python(
            "python.tools.trivy",
            "Enable trivy (container scanner)?",
            "python.tools.trivy.enabled",
            true,
        ),
        python(
            "python.tools.codeql",
            "Enable codeql (code analysis)?",
            "python.tools.codeql.enabled",
            false,
        ),
        python("python.tools.docker", "Enable docker builds?", "python.tools.docker.enabled", false),
        WizardStep::select("java.build_tool", "Build tool:", "java.build_tool", &["maven", "gradle"])
            .with_default("maven")
            .when(Activation::equals("language", "java")),
        WizardStep::select("java.version", "Java version:", "java.version", &["21", "17", "11", "8"])
            .with_default("17")
            .when(Activation::equals("language", "java")),
        java("java.tools.junit", "Enable JUnit tests?", "java.tools.junit.enabled", true),
        java("java.tools.jacoco", "Enable JaCoCo coverage?", "java.tools.jacoco.enabled", true),
        java("java.tools.pitest", "Enable PITest mutation testing?", "java.tools.pitest.enabled", true),
        WizardStep::text(
            "java.tools.pitest.timeout_multiplier",
            "PITest timeout multiplier (default 2):",
            "java.tools.pitest.timeout_multiplier",
        )
        .with_default("2")
        .parse_with(ValueParser::Integer { min: Some(1) })
        .when(
            Activation::equals("language", "java")
                .and(Activation::not_equals("java.tools.pitest.enabled", false)),
        ),
        java("java.tools.checkstyle", "Enable Checkstyle?", "java.tools.checkstyle.enabled", true),
        java("java.tools.spotbugs", "Enable SpotBugs?", "java.tools.spotbugs.enabled", false),
        java("java.tools.owasp", "Enable OWASP dependency check?", "java.tools.owasp.enabled", true),
        WizardStep::text(
            "java.tools.owasp.timeout_seconds",
            "OWASP timeout in seconds (default 1800):",
            "java.tools.owasp.timeout_seconds",
        )
        .with_default("1800")
        .parse_with(ValueParser::Integer { min: Some(60) })
        .when(
            Activation::equals("language", "java")
                .and(Activation::not_equals("java.tools.owasp.enabled", false)),
        ),
        WizardStep::confirm(
            "security.gitleaks",
            "Enable gitleaks (secret scanning)?",
            "security.gitleaks.enabled",
            true,
        ),
        WizardStep::text("thresholds.coverage", "Coverage threshold (%):", "thresholds.coverage_min")
            .with_default("80")
            .parse_with(ValueParser::Number),
        WizardStep::text(
            "thresholds.max_critical",
            "Max critical vulnerabilities allowed:",
            "thresholds.max_critical_vulns",
        )
        .with_default("0")
        .parse_with(ValueParser::Integer { min: None }),
    ]
}

/// Ordered catalog for a flow: lead-in steps, the shared base questions, and
/// the trailing apply-or-dry-run question.
///
/// `profiles` are the selectable profile names; the profile question is only
/// asked in the new-repo flow and only when there is something to choose.
pub fn build_catalog(flow: WizardFlow, profiles: &[String]) -> Vec<WizardStep> {
    let mut steps = Vec::new();

    match flow {
        WizardFlow::New if !profiles.is_empty() => {
            let choices: Vec<&str> = std::iter::once(NO_PROFILE)
                .chain(profiles.iter().map(String::as_str))
                .collect();
            steps.push(
                WizardStep::select("meta.profile", "Apply a profile?", meta_keys::PROFILE_NAME, &choices)
                    .with_default(NO_PROFILE)
                    .in_metadata()
                    .with_effect(StepEffect::ApplyProfile),
            );
        }
        WizardFlow::New => {}
        WizardFlow::Init => steps.push(
            WizardStep::text("meta.repo_path", "Repo path:", meta_keys::REPO_PATH)
                .with_default(".")
                .in_metadata(),
        ),
        WizardFlow::ConfigEdit => steps.push(
            WizardStep::text("meta.repo_name", "Repo config name:", meta_keys::REPO_NAME)
                .in_metadata()
                .with_effect(StepEffect::LoadExistingConfig),
        ),
    }

    steps.extend(base_config_steps());

    steps.push(
        WizardStep::confirm("meta.apply", "Write files now?", meta_keys::APPLY, true).in_metadata(),
    );

    steps
}
