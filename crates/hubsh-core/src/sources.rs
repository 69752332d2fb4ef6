//! Collaborators the wizard and the shell fetch data from.

use crate::document::Document;
use crate::error::{RegistryError, SourceError};
use crate::process::CihubRunner;
use crate::profiles::{fallback_profile, ProfileSummary, FALLBACK_PROFILES};
use crate::registry::CommandRegistry;
use hubsh_types::CommandResult;
use std::future::Future;
use tracing::{debug, info, warn};

/// Data the wizard needs while it runs.
pub trait WizardSources {
    /// Configuration fragment for a profile. `Ok(None)` means the profile is
    /// unknown.
    fn profile_config(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Document>, SourceError>> + Send;

    /// Current configuration of a registered repository.
    fn existing_config(
        &self,
        repo: &str,
    ) -> impl Future<Output = Result<Document, SourceError>> + Send;
}

/// All collaborators, backed by the `cihub` subprocess.
#[derive(Debug, Clone)]
pub struct CihubSources {
    runner: CihubRunner,
}

impl CihubSources {
    pub fn new(runner: CihubRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &CihubRunner {
        &self.runner
    }

    /// `cihub commands list`, indexed.
    pub async fn fetch_registry(&self) -> Result<CommandRegistry, RegistryError> {
        let result = self
            .runner
            .run("commands", &["list".to_string()], true)
            .await
            .map_err(|e| RegistryError::Fetch(e.to_string()))?;
        CommandRegistry::from_result(&result)
    }

    /// Profiles offered by the tool, else the built-in table.
    pub async fn list_profiles(&self) -> Vec<ProfileSummary> {
        match self.runner.run("profile", &["list".to_string()], true).await {
            Ok(result) => {
                let profiles: Vec<ProfileSummary> = result
                    .data_field("profiles")
                    .cloned()
                    .and_then(|value| serde_json::from_value(value).ok())
                    .unwrap_or_default();
                if !profiles.is_empty() {
                    debug!(target: "hubsh::wizard", "Tool listed {} profiles", profiles.len());
                    return profiles;
                }
            }
            Err(e) => {
                warn!(target: "hubsh::wizard", "Profile list unavailable, using built-ins: {}", e);
            }
        }
        FALLBACK_PROFILES.clone()
    }
}

fn failed(result: &CommandResult, command: &str) -> Option<SourceError> {
    (result.exit_code != 0).then(|| SourceError::Execution {
        command: command.to_string(),
        message: result
            .summary
            .clone()
            .unwrap_or_else(|| format!("exit code {}", result.exit_code)),
    })
}

impl WizardSources for CihubSources {
    async fn profile_config(&self, name: &str) -> Result<Option<Document>, SourceError> {
        let args = ["show".to_string(), name.to_string()];
        match self.runner.run("profile", &args, true).await {
            Ok(result) => {
                if let Some(profile) = result.data_field("profile").cloned().and_then(Document::from_json) {
                    return Ok(Some(profile));
                }
                debug!(target: "hubsh::wizard", "Tool has no profile '{}'", name);
            }
            Err(e) => {
                warn!(target: "hubsh::wizard", "profile show {} failed, using built-ins: {}", name, e);
            }
        }
        Ok(fallback_profile(name))
    }

    async fn existing_config(&self, repo: &str) -> Result<Document, SourceError> {
        let args = ["show".to_string(), "--repo".to_string(), repo.to_string()];
        let result = self.runner.run("config", &args, true).await?;
        if let Some(err) = failed(&result, "config show") {
            return Err(err);
        }
        let config = result
            .data_field("config")
            .cloned()
            .and_then(Document::from_json)
            .unwrap_or_default();
        info!(
            target: "hubsh::wizard",
            "Fetched config for '{}' ({} top-level keys)",
            repo,
            config.len()
        );
        Ok(config)
    }
}
