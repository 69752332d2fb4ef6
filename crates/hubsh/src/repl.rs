//! The line-oriented interactive loop.

use crate::dispatch::{self, Action, REGISTRY_HINT, REGISTRY_UNAVAILABLE};
use crate::render::Output;
use crate::state::ShellState;
use anyhow::Result;
use hubsh_core::wizard::build_catalog;
use hubsh_core::{
    parse_input, resolve, CommandRegistry, FetchTicket, Invocation, RegistryError, StepError,
    Transition, WizardLaunch, WizardSession,
};
use hubsh_types::{Severity, WizardFlow};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type RegistryUpdate = (FetchTicket, Result<CommandRegistry, RegistryError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W> {
    state: ShellState,
    out: W,
    warned_unavailable: bool,
}

impl<W: Write> Shell<W> {
    pub fn new(state: ShellState, out: W) -> Self {
        Self {
            state,
            out,
            warned_unavailable: false,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read lines until `/exit` or end of input.
    ///
    /// The registry is fetched in the background; lines typed before it
    /// arrives resolve as unverified passthroughs.
    pub async fn run<R: AsyncBufRead + Unpin>(mut self, input: R) -> Result<W> {
        let (tx, mut rx) = mpsc::channel::<RegistryUpdate>(1);
        self.spawn_registry_fetch(tx);

        let mut lines = input.lines();
        let mut needs_prompt = true;
        loop {
            if needs_prompt {
                write!(self.out, "{}", self.state.prompt())?;
                self.out.flush()?;
            }

            tokio::select! {
                Some((ticket, result)) = rx.recv() => {
                    needs_prompt = self.apply_registry(ticket, result)?;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!(target: "hubsh::repl", "End of input");
                        writeln!(self.out)?;
                        break;
                    };
                    needs_prompt = true;
                    if self.handle_line(&line).await? == Flow::Exit {
                        break;
                    }
                }
            }
        }

        self.state.registry.invalidate();
        info!(target: "hubsh::repl", "Session ended");
        Ok(self.out)
    }

    fn spawn_registry_fetch(&mut self, tx: mpsc::Sender<RegistryUpdate>) {
        let ticket = self.state.registry.begin_fetch();
        let sources = self.state.sources.clone();
        tokio::spawn(async move {
            let result = sources.fetch_registry().await;
            if tx.send((ticket, result)).await.is_err() {
                debug!(target: "hubsh::registry", "Shell closed before registry arrived");
            }
        });
    }

    /// Publish a fetch result. Returns whether anything was printed.
    pub fn apply_registry(
        &mut self,
        ticket: FetchTicket,
        result: Result<CommandRegistry, RegistryError>,
    ) -> Result<bool> {
        if !self.state.registry.complete(ticket, result) {
            return Ok(false);
        }
        let Some(reason) = self.state.registry.unavailable_reason().map(String::from) else {
            return Ok(false);
        };
        if self.warned_unavailable {
            return Ok(false);
        }
        self.warned_unavailable = true;

        let output = Output::new(REGISTRY_UNAVAILABLE, Some(Severity::Warning))
            .with_details(vec![reason, REGISTRY_HINT.to_string()]);
        writeln!(self.out)?;
        self.print(&output)?;
        Ok(true)
    }

    /// Handle one input line, in the wizard when one is active.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        if self.state.in_wizard() {
            self.wizard_line(line).await?;
            return Ok(Flow::Continue);
        }
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        let parsed = match parse_input(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.print(&Output::failure("Command failed", e.to_string()))?;
                return Ok(Flow::Continue);
            }
        };
        let resolved = resolve(&parsed, self.state.registry.registry());

        match dispatch::plan(resolved, &self.state.registry) {
            Action::Exit => return Ok(Flow::Exit),
            Action::Clear => {
                if self.state.config.ui.color {
                    write!(self.out, "\x1b[2J\x1b[H")?;
                    self.out.flush()?;
                }
            }
            Action::Help { tables, note } => {
                let mut output = Output::new("Available commands", Some(Severity::Info))
                    .with_tables(tables);
                if !note.is_empty() {
                    output.status = Some(Severity::Warning);
                    output.details = note;
                }
                self.print(&output)?;
            }
            Action::GroupHelp { group, table } => {
                let output = Output::new(format!("/{} is a command group", group), Some(Severity::Info))
                    .with_details(vec!["Select a subcommand to run:".to_string()])
                    .with_tables(table.into_iter().collect());
                self.print(&output)?;
            }
            Action::Refuse { summary, details } => {
                self.print(&Output::new(summary, Some(Severity::Warning)).with_details(details))?;
            }
            Action::StartWizard(launch) => self.start_wizard(launch).await?,
            Action::Run(invocation) => {
                let output = self.execute(&invocation, "Command failed").await;
                self.print(&output)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn start_wizard(&mut self, launch: WizardLaunch) -> Result<()> {
        let profiles: Vec<String> = if launch.flow == WizardFlow::New {
            self.state
                .sources
                .list_profiles()
                .await
                .into_iter()
                .map(|profile| profile.name)
                .collect()
        } else {
            Vec::new()
        };

        let session = WizardSession::with_seed(
            launch.flow,
            build_catalog(launch.flow, &profiles),
            launch.config,
            launch.meta,
        );
        info!(target: "hubsh::repl", "Started {} wizard {}", launch.flow, session.id());
        self.state.wizard = Some(session);
        self.print_prompt()
    }

    async fn wizard_line(&mut self, line: &str) -> Result<()> {
        let Some(session) = self.state.wizard.as_mut() else {
            return Ok(());
        };

        match session.submit(line, &self.state.sources).await {
            Ok(Transition::Next) | Ok(Transition::Back) => self.print_prompt(),
            Ok(Transition::Cancelled) => {
                self.state.wizard = None;
                self.print(&Output::new("Wizard cancelled", Some(Severity::Info)))
            }
            Ok(Transition::Completed(result)) => {
                self.state.wizard = None;
                let output = match result.into_invocation() {
                    Ok(invocation) => self.execute(&invocation, "Wizard command failed").await,
                    Err(e) => Output::failure("Wizard command failed", e.to_string()),
                };
                self.print(&output)
            }
            Err(StepError::Closed) => {
                self.state.wizard = None;
                Ok(())
            }
            Err(e) => {
                let summary = match e {
                    StepError::SideEffect(_) => "Wizard step failed",
                    _ => "Invalid answer",
                };
                self.print(&Output::failure(summary, e.to_string()))?;
                self.print_prompt()
            }
        }
    }

    async fn execute(&self, invocation: &Invocation, failure: &str) -> Output {
        debug!(target: "hubsh::repl", "Running '{}'", invocation.display());
        match self
            .state
            .sources
            .runner()
            .run(&invocation.command, &invocation.args, true)
            .await
        {
            Ok(result) => Output::from_result(&result, self.state.config.ui.show_duration),
            Err(e) => {
                warn!(target: "hubsh::repl", "'{}' failed: {}", invocation.display(), e);
                Output::failure(failure, e.to_string())
            }
        }
    }

    fn print_prompt(&mut self) -> Result<()> {
        let Some(prompt) = self.state.wizard.as_ref().and_then(WizardSession::prompt) else {
            return Ok(());
        };
        let text = self.state.renderer.prompt(&prompt);
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    fn print(&mut self, output: &Output) -> Result<()> {
        let text = self.state.renderer.output(output);
        writeln!(self.out, "{}", text)?;
        Ok(())
    }
}
