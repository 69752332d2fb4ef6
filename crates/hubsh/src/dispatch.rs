//! What the shell does with a resolved line.
//!
//! `plan` is pure: it never spawns anything, so every branch of the policy
//! can be tested without the tool installed.

use hubsh_core::{
    help_tables_for, plan_launch, Invocation, RegistrySlot, Resolved, WizardLaunch,
};
use hubsh_types::{HelpTable, MetaCommand};
use tracing::debug;

/// Flags that ask a command for its own interactive mode.
const INTERACTIVE_FLAGS: [&str; 2] = ["--wizard", "--interactive"];

pub const REGISTRY_UNAVAILABLE: &str =
    "Command registry unavailable; using fallback meta commands only.";
pub const REGISTRY_HINT: &str = "Install/update the Python CLI and rerun.";
pub const REGISTRY_LOADING: &str = "Command registry still loading; showing meta commands only.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Help {
        tables: Vec<HelpTable>,
        /// Shown when the listing lacks the tool's commands.
        note: Vec<String>,
    },
    Clear,
    Exit,
    GroupHelp {
        /// First path token of the group.
        group: String,
        table: Option<HelpTable>,
    },
    StartWizard(WizardLaunch),
    Refuse {
        summary: &'static str,
        details: Vec<String>,
    },
    Run(Invocation),
}

/// Decide the action for `resolved` given the current registry state.
pub fn plan(resolved: Resolved, slot: &RegistrySlot) -> Action {
    match resolved {
        Resolved::Meta(MetaCommand::Help) => Action::Help {
            tables: help_tables_for(slot.registry()),
            note: help_note(slot),
        },
        Resolved::Meta(MetaCommand::Clear) => Action::Clear,
        Resolved::Meta(MetaCommand::Exit) => Action::Exit,
        Resolved::Group { descriptor, .. } => {
            let group = descriptor.root().to_string();
            let table = slot
                .registry()
                .and_then(|registry| registry.group_help_table(&group));
            Action::GroupHelp { group, table }
        }
        Resolved::Runnable(runnable) => {
            if let Some(launch) = plan_launch(&runnable) {
                return Action::StartWizard(launch);
            }

            if let Some(descriptor) = runnable.descriptor() {
                if !descriptor.json_at_runtime() {
                    debug!(target: "hubsh::repl", "Refusing '{}': no JSON output", runnable.command);
                    return Action::Refuse {
                        summary: "Command not supported in JSON mode",
                        details: vec![
                            format!("/{} does not support JSON output.", runnable.command),
                            "Run this command in your terminal using the Python CLI.".to_string(),
                        ],
                    };
                }
                let wants_interactive = runnable
                    .args
                    .iter()
                    .any(|arg| INTERACTIVE_FLAGS.contains(&arg.as_str()));
                if descriptor.interactive() && wants_interactive {
                    debug!(target: "hubsh::repl", "Refusing '{}': interactive mode", runnable.command);
                    return Action::Refuse {
                        summary: "Interactive commands are not supported here",
                        details: vec![
                            "This command launches an interactive wizard.".to_string(),
                            "Run it in your terminal without hubsh.".to_string(),
                        ],
                    };
                }
            }

            Action::Run(runnable.invocation())
        }
    }
}

fn help_note(slot: &RegistrySlot) -> Vec<String> {
    if slot.registry().is_some() {
        Vec::new()
    } else if slot.unavailable_reason().is_some() {
        vec![REGISTRY_UNAVAILABLE.to_string(), REGISTRY_HINT.to_string()]
    } else {
        vec![REGISTRY_LOADING.to_string()]
    }
}
