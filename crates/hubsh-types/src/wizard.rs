//! Wizard flow identifiers shared between the engine and the shell.

use serde::{Deserialize, Serialize};

/// Which catalog variant a wizard session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardFlow {
    /// Scaffold a new repository (`new`)
    New,
    /// Initialise an existing checkout (`init`)
    Init,
    /// Edit a registered repository's configuration (`config edit`)
    ConfigEdit,
}

impl WizardFlow {
    /// Heading shown above the wizard.
    pub fn label(self) -> &'static str {
        match self {
            WizardFlow::New => "New Repo",
            WizardFlow::Init => "Init",
            WizardFlow::ConfigEdit => "Config Edit",
        }
    }
}

impl std::fmt::Display for WizardFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WizardFlow::New => "new",
            WizardFlow::Init => "init",
            WizardFlow::ConfigEdit => "config-edit",
        })
    }
}
