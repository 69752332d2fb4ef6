//! Command resolution and configuration wizard for hubsh.

pub mod document;
mod error;
mod parser;
mod process;
mod profiles;
mod registry;
mod resolver;
mod sources;
pub mod wizard;

pub use document::{deep_merge, DocPath, Document, Node};
pub use error::{HubshError, InputError, RegistryError, SourceError, StepError};
pub use parser::{parse_input, split_args, ParsedInput, TOOL_NAME};
pub use process::{command_timeout, CihubRunner, ToolProgram, DEFAULT_TIMEOUT};
pub use profiles::{fallback_profile, fallback_profile_names, ProfileSummary, FALLBACK_PROFILES};
pub use registry::{help_tables_for, CommandRegistry, FetchTicket, RegistrySlot};
pub use resolver::{resolve, Invocation, Resolved, Runnable, Verification};
pub use sources::{CihubSources, WizardSources};
pub use wizard::{
    plan_launch, RunMetadata, StepPrompt, Transition, WizardLaunch, WizardResult, WizardSession,
};

/// Result type for hubsh operations.
pub type Result<T> = std::result::Result<T, HubshError>;
