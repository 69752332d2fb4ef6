//! Read-only index over the commands advertised by the tool.

use crate::error::RegistryError;
use hubsh_types::{CommandDescriptor, CommandResult, CommandsPayload, HelpTable};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Index built once per command-list fetch. Never mutated after construction.
#[derive(Debug)]
pub struct CommandRegistry {
    entries: Vec<Arc<CommandDescriptor>>,
    leaves: HashMap<String, Arc<CommandDescriptor>>,
    groups: HashMap<String, Arc<CommandDescriptor>>,
    max_depth: usize,
    help_tables: Vec<HelpTable>,
    cli_version: Option<String>,
}

impl CommandRegistry {
    /// Build the index from raw descriptors.
    ///
    /// A descriptor with neither a path nor a command string fails the whole
    /// build; the registry is never partially populated.
    pub fn build(descriptors: Vec<CommandDescriptor>) -> Result<Self, RegistryError> {
        let entries = descriptors
            .into_iter()
            .enumerate()
            .map(|(index, descriptor)| {
                descriptor
                    .normalized()
                    .map(Arc::new)
                    .ok_or(RegistryError::MalformedDescriptor(index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut leaves = HashMap::new();
        let mut groups = HashMap::new();
        for entry in &entries {
            let map = if entry.is_group { &mut groups } else { &mut leaves };
            if map.insert(entry.command.clone(), Arc::clone(entry)).is_some() {
                debug!(
                    target: "hubsh::registry",
                    "Duplicate descriptor for '{}', keeping the later one",
                    entry.command
                );
            }
        }

        let max_depth = entries
            .iter()
            .map(|entry| entry.path.len().max(entry.command.split_whitespace().count()))
            .fold(1, usize::max);

        let help_tables = build_help_tables(&entries);

        Ok(Self {
            entries,
            leaves,
            groups,
            max_depth,
            help_tables,
            cli_version: None,
        })
    }

    pub fn from_payload(payload: CommandsPayload) -> Result<Self, RegistryError> {
        let cli_version = payload.cli_version.clone();
        let mut registry = Self::build(payload.commands)?;
        registry.cli_version = cli_version;
        Ok(registry)
    }

    /// Build from the envelope of `cihub commands list --json`.
    pub fn from_result(result: &CommandResult) -> Result<Self, RegistryError> {
        let payload =
            CommandsPayload::from_data(&result.data_value()).ok_or(RegistryError::MissingPayload)?;
        Self::from_payload(payload)
    }

    /// Runnable descriptor for a canonical command string.
    pub fn exact_leaf(&self, key: &str) -> Option<&Arc<CommandDescriptor>> {
        self.leaves.get(key)
    }

    /// Group descriptor for a canonical command string.
    pub fn exact_group(&self, key: &str) -> Option<&Arc<CommandDescriptor>> {
        self.groups.get(key)
    }

    /// Longest token path across all descriptors (at least 1).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn entries(&self) -> &[Arc<CommandDescriptor>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cli_version(&self) -> Option<&str> {
        self.cli_version.as_deref()
    }

    /// Meta table followed by one table per command group.
    pub fn help_tables(&self) -> &[HelpTable] {
        &self.help_tables
    }

    /// Leaf commands whose first path token is `group`.
    pub fn group_help_table(&self, group: &str) -> Option<HelpTable> {
        let mut members: Vec<&CommandDescriptor> = self
            .entries
            .iter()
            .filter(|entry| !entry.is_group && entry.root() == group)
            .map(Arc::as_ref)
            .collect();
        if members.is_empty() {
            return None;
        }
        members.sort_by(|a, b| a.command.cmp(&b.command));
        Some(HelpTable::new(format!("{group} commands"), help_rows(&members)))
    }
}

/// Help listing for an optional registry; only meta commands without one.
pub fn help_tables_for(registry: Option<&CommandRegistry>) -> Vec<HelpTable> {
    match registry {
        Some(registry) => registry.help_tables().to_vec(),
        None => vec![HelpTable::meta()],
    }
}

fn build_help_tables(entries: &[Arc<CommandDescriptor>]) -> Vec<HelpTable> {
    let mut grouped: BTreeMap<&str, Vec<&CommandDescriptor>> = BTreeMap::new();
    for entry in entries.iter().filter(|entry| !entry.is_group) {
        let key = if entry.path.len() == 1 {
            "Top-level"
        } else {
            entry.root()
        };
        grouped.entry(key).or_default().push(entry);
    }

    let mut tables = vec![HelpTable::meta()];
    for (group, mut members) in grouped {
        members.sort_by(|a, b| a.command.cmp(&b.command));
        tables.push(HelpTable::new(format!("{group} commands"), help_rows(&members)));
    }
    tables
}

fn help_rows(members: &[&CommandDescriptor]) -> Vec<Vec<String>> {
    members
        .iter()
        .map(|entry| {
            vec![
                format!("/{}", entry.command),
                entry.help.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// Identifies one registry fetch. Only the newest ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Holder for the session's current registry with a stale-result guard.
#[derive(Debug, Default)]
pub struct RegistrySlot {
    generation: u64,
    registry: Option<Arc<CommandRegistry>>,
    unavailable: Option<String>,
}

impl RegistrySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding any fetch still in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Drop interest in every in-flight fetch (session teardown).
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Publish a fetch result. Returns `false` when the ticket is stale and
    /// the result was discarded.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<CommandRegistry, RegistryError>,
    ) -> bool {
        if ticket.0 != self.generation {
            debug!(
                target: "hubsh::registry",
                "Discarding stale registry fetch (ticket {}, current {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        match result {
            Ok(registry) => {
                info!(
                    target: "hubsh::registry",
                    "Loaded {} commands (max depth {})",
                    registry.len(),
                    registry.max_depth()
                );
                self.registry = Some(Arc::new(registry));
                self.unavailable = None;
            }
            Err(e) => {
                warn!(target: "hubsh::registry", "Command registry unavailable: {}", e);
                self.registry = None;
                self.unavailable = Some(e.to_string());
            }
        }
        true
    }

    pub fn registry(&self) -> Option<&CommandRegistry> {
        self.registry.as_deref()
    }

    pub fn shared(&self) -> Option<Arc<CommandRegistry>> {
        self.registry.clone()
    }

    /// Why the last fetch failed, if it did.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandRegistry {
        CommandRegistry::build(vec![
            CommandDescriptor::leaf(&["check"]).with_help("Run checks"),
            CommandDescriptor::group(&["report"]),
            CommandDescriptor::leaf(&["report", "build"]).with_help("Build report"),
            CommandDescriptor::leaf(&["report", "aggregate"]),
            CommandDescriptor::leaf(&["hub-ci", "ruff"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_partitions_leaves_and_groups() {
        let registry = sample();
        assert!(registry.exact_leaf("report build").is_some());
        assert!(registry.exact_leaf("report").is_none());
        assert!(registry.exact_group("report").is_some());
        assert_eq!(registry.max_depth(), 2);
    }

    #[test]
    fn test_empty_registry_has_depth_one() {
        let registry = CommandRegistry::build(Vec::new()).unwrap();
        assert_eq!(registry.max_depth(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_malformed_descriptor_fails_build() {
        let err = CommandRegistry::build(vec![
            CommandDescriptor::leaf(&["check"]),
            CommandDescriptor::default(),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::MalformedDescriptor(1));
    }

    #[test]
    fn test_help_tables_grouped_and_sorted() {
        let registry = sample();
        let titles: Vec<&str> = registry
            .help_tables()
            .iter()
            .map(|table| table.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["Meta commands", "Top-level commands", "hub-ci commands", "report commands"]
        );

        let report = &registry.help_tables()[3];
        assert_eq!(report.rows[0], vec!["/report aggregate", ""]);
        assert_eq!(report.rows[1], vec!["/report build", "Build report"]);
    }

    #[test]
    fn test_group_help_table() {
        let registry = sample();
        let table = registry.group_help_table("report").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(registry.group_help_table("nope").is_none());
    }

    #[test]
    fn test_help_without_registry_is_meta_only() {
        let tables = help_tables_for(None);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
    }

    #[test]
    fn test_slot_discards_stale_fetch() {
        let mut slot = RegistrySlot::new();
        let first = slot.begin_fetch();
        let second = slot.begin_fetch();

        assert!(!slot.complete(first, Ok(sample())));
        assert!(slot.registry().is_none());

        assert!(slot.complete(second, Ok(sample())));
        assert!(slot.registry().is_some());
    }

    #[test]
    fn test_slot_records_failure() {
        let mut slot = RegistrySlot::new();
        let ticket = slot.begin_fetch();
        assert!(slot.complete(ticket, Err(RegistryError::MissingPayload)));
        assert!(slot.registry().is_none());
        assert_eq!(
            slot.unavailable_reason(),
            Some("Command registry missing from CLI output")
        );
    }

    #[test]
    fn test_slot_invalidate_drops_in_flight() {
        let mut slot = RegistrySlot::new();
        let ticket = slot.begin_fetch();
        slot.invalidate();
        assert!(!slot.complete(ticket, Ok(sample())));
    }
}
