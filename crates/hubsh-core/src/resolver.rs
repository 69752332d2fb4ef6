//! Maps tokenized input onto meta commands, command groups, or runnable commands.

use crate::parser::ParsedInput;
use crate::registry::CommandRegistry;
use hubsh_types::{CommandDescriptor, MetaCommand};
use std::sync::Arc;
use tracing::debug;

/// How much the resolver vouches for a runnable command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Matched a descriptor in the registry.
    Verified(Arc<CommandDescriptor>),
    /// Passed through as typed, with nothing to validate against.
    Unverified,
}

/// A command ready for the execution boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runnable {
    /// Canonical command string (e.g. `"report build"`), or the raw command
    /// token for unverified input.
    pub command: String,
    /// Tokens left over after the matched command path.
    pub args: Vec<String>,
    pub verification: Verification,
}

impl Runnable {
    pub fn descriptor(&self) -> Option<&CommandDescriptor> {
        match &self.verification {
            Verification::Verified(descriptor) => Some(descriptor),
            Verification::Unverified => None,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Verification::Verified(_))
    }

    /// Split into the tool's top-level subcommand and its argv.
    ///
    /// Tokens embedded in a multi-token command string come first, then the
    /// residual arguments.
    pub fn invocation(&self) -> Invocation {
        let mut tokens = self.command.split(' ').filter(|t| !t.is_empty());
        let command = tokens.next().unwrap_or_default().to_string();
        let args = tokens
            .map(String::from)
            .chain(self.args.iter().cloned())
            .collect();
        Invocation { command, args }
    }
}

/// Subcommand and arguments handed to the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Human-readable `command arg...` form for logs and messages.
    pub fn display(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Outcome of resolving one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Meta(MetaCommand),
    /// An exact, fully consumed group name. Groups are never executed.
    Group {
        command: String,
        descriptor: Arc<CommandDescriptor>,
    },
    Runnable(Runnable),
}

/// Resolve tokenized input against an optional registry.
///
/// Meta commands shadow same-named remote commands. Among registry matches
/// the longest token prefix wins; a group only matches when no tokens trail
/// it. Without a registry, or for free-form (non-slash) input, the command is
/// passed through unverified.
pub fn resolve(parsed: &ParsedInput, registry: Option<&CommandRegistry>) -> Resolved {
    if parsed.is_slash {
        if let Some(registry) = registry {
            if let Some(meta) = MetaCommand::from_name(&parsed.command) {
                return Resolved::Meta(meta);
            }
            if let Some(resolved) = match_prefix(&parsed.tokens(), registry) {
                return resolved;
            }
        }
        if let Some(meta) = MetaCommand::from_name(&parsed.command) {
            return Resolved::Meta(meta);
        }
    }

    debug!(
        target: "hubsh::resolve",
        "Passing '{}' through unverified",
        parsed.command
    );
    Resolved::Runnable(Runnable {
        command: parsed.command.clone(),
        args: parsed.args.clone(),
        verification: Verification::Unverified,
    })
}

fn match_prefix(tokens: &[String], registry: &CommandRegistry) -> Option<Resolved> {
    let max_depth = tokens.len().min(registry.max_depth());
    for depth in (1..=max_depth).rev() {
        let key = tokens[..depth].join(" ");
        let remaining = &tokens[depth..];

        if let Some(descriptor) = registry.exact_leaf(&key) {
            debug!(target: "hubsh::resolve", "Matched command '{}' at depth {}", key, depth);
            return Some(Resolved::Runnable(Runnable {
                command: descriptor.command.clone(),
                args: remaining.to_vec(),
                verification: Verification::Verified(Arc::clone(descriptor)),
            }));
        }

        if let Some(descriptor) = registry.exact_group(&key) {
            if remaining.is_empty() {
                debug!(target: "hubsh::resolve", "Matched group '{}'", key);
                return Some(Resolved::Group {
                    command: key,
                    descriptor: Arc::clone(descriptor),
                });
            }
        }
    }
    None
}
