//! Wizard session state machine.

use super::catalog::{meta_keys, NO_PROFILE};
use super::step::{display_default, value_text, StepEffect, StepKind, StepScope, WizardStep};
use super::{RunMetadata, WizardResult};
use crate::document::Document;
use crate::error::StepError;
use crate::sources::WizardSources;
use hubsh_types::WizardFlow;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Catalog positions of the steps active for `config`, in catalog order.
///
/// Always computed fresh from the current document; never cache the result
/// across configuration changes.
pub fn active_steps(catalog: &[WizardStep], config: &Document) -> Vec<usize> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, step)| step.activation.is_active(config))
        .map(|(position, _)| position)
        .collect()
}

/// One raw line typed while a wizard is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardInput<'a> {
    Cancel,
    Back,
    Answer(&'a str),
}

impl<'a> WizardInput<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.trim() {
            "/cancel" | "/exit" => WizardInput::Cancel,
            "/back" => WizardInput::Back,
            answer => WizardInput::Answer(answer),
        }
    }
}

/// What a submitted line did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Moved on to another step.
    Next,
    /// Went back one step (or stayed on the first).
    Back,
    /// The session was abandoned; nothing is handed on.
    Cancelled,
    Completed(WizardResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStatus {
    Active,
    Cancelled,
    Completed,
}

/// Everything needed to show the current question.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPrompt {
    pub title: &'static str,
    pub step_id: &'static str,
    pub question: &'static str,
    pub kind: StepKind,
    pub choices: Vec<String>,
    /// Effective default as shown to the user.
    pub default: Option<String>,
    /// 1-based position in the active step list.
    pub position: usize,
    pub total: usize,
}

impl StepPrompt {
    pub fn progress_label(&self) -> String {
        format!("Step {} of {}", self.position, self.total)
    }
}

/// One in-progress wizard.
///
/// `submit` takes `&mut self`, so a second answer cannot be accepted while a
/// side-effect fetch for the previous one is still pending.
#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    flow: WizardFlow,
    catalog: Vec<WizardStep>,
    config: Document,
    meta: RunMetadata,
    /// Index into the active step list.
    index: usize,
    status: WizardStatus,
}

impl WizardSession {
    pub fn new(flow: WizardFlow, catalog: Vec<WizardStep>) -> Self {
        Self::with_seed(flow, catalog, Document::new(), RunMetadata::new())
    }

    /// Start with pre-filled documents (e.g. from command-line flags).
    /// Seeded values become the defaults of their steps.
    pub fn with_seed(
        flow: WizardFlow,
        catalog: Vec<WizardStep>,
        config: Document,
        meta: RunMetadata,
    ) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            flow,
            catalog,
            config,
            meta,
            index: 0,
            status: WizardStatus::Active,
        };
        info!(
            target: "hubsh::wizard",
            "Started {} wizard {} ({} steps in catalog)",
            flow,
            session.id,
            session.catalog.len()
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn flow(&self) -> WizardFlow {
        self.flow
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == WizardStatus::Active
    }

    pub fn config(&self) -> &Document {
        &self.config
    }

    pub fn meta(&self) -> &RunMetadata {
        &self.meta
    }

    pub fn current_step(&self) -> Option<&WizardStep> {
        if !self.is_active() {
            return None;
        }
        let active = active_steps(&self.catalog, &self.config);
        active.get(self.index).map(|&position| &self.catalog[position])
    }

    /// `(position, total)` over the active step list, 1-based.
    pub fn progress(&self) -> (usize, usize) {
        let total = active_steps(&self.catalog, &self.config).len();
        (self.index + 1, total)
    }

    pub fn prompt(&self) -> Option<StepPrompt> {
        let step = self.current_step()?;
        let (position, total) = self.progress();
        Some(StepPrompt {
            title: self.flow.label(),
            step_id: step.id,
            question: step.question,
            kind: step.kind,
            choices: step.choices.clone(),
            default: self.effective_default(step).as_ref().and_then(display_default),
            position,
            total,
        })
    }

    /// Abandon the session, discarding both documents.
    pub fn cancel(&mut self) {
        if self.is_active() {
            info!(target: "hubsh::wizard", "Cancelled wizard {}", self.id);
        }
        self.config = Document::new();
        self.meta.clear();
        self.status = WizardStatus::Cancelled;
    }

    /// Handle one line of input.
    ///
    /// Validation and side-effect failures leave the session exactly as it
    /// was, so the same step is asked again.
    pub async fn submit<S: WizardSources>(
        &mut self,
        raw: &str,
        sources: &S,
    ) -> Result<Transition, StepError> {
        if !self.is_active() {
            return Err(StepError::Closed);
        }

        let answer = match WizardInput::parse(raw) {
            WizardInput::Cancel => {
                self.cancel();
                return Ok(Transition::Cancelled);
            }
            WizardInput::Back => {
                self.index = self.index.saturating_sub(1);
                debug!(target: "hubsh::wizard", "Back to step {}", self.index + 1);
                return Ok(Transition::Back);
            }
            WizardInput::Answer(answer) => answer,
        };

        let active = active_steps(&self.catalog, &self.config);
        let Some(&position) = active.get(self.index).or(active.last()) else {
            return Ok(self.complete());
        };
        let step = &self.catalog[position];

        let fallback = self.effective_default(step);
        let value = step.resolve_answer(answer, fallback.as_ref())?;

        let mut config = self.config.clone();
        let mut meta = self.meta.clone();
        match step.scope {
            StepScope::Config => config.set(&step.key, value.clone()),
            StepScope::Meta => meta.set(step.key.to_string(), value.clone()),
        }

        if let Some(effect) = step.effect {
            run_effect(effect, &value, &mut config, &mut meta, sources).await?;
        }

        debug!(target: "hubsh::wizard", "Answered '{}' with {}", step.id, value);

        self.config = config;
        self.meta = meta;

        let active = active_steps(&self.catalog, &self.config);
        match active.iter().position(|&later| later > position) {
            Some(next) => {
                self.index = next;
                Ok(Transition::Next)
            }
            None => Ok(self.complete()),
        }
    }

    /// The value already stored at the step's key, else the step default.
    fn effective_default(&self, step: &WizardStep) -> Option<Value> {
        let stored = match step.scope {
            StepScope::Config => self.config.get_value(&step.key),
            StepScope::Meta => self.meta.get(&step.key.to_string()),
        };
        stored
            .filter(|value| !value.is_null())
            .or(step.default.as_ref())
            .cloned()
    }

    fn complete(&mut self) -> Transition {
        self.status = WizardStatus::Completed;
        info!(target: "hubsh::wizard", "Completed {} wizard {}", self.flow, self.id);
        Transition::Completed(WizardResult {
            flow: self.flow,
            config: std::mem::take(&mut self.config),
            meta: std::mem::take(&mut self.meta),
        })
    }
}

async fn run_effect<S: WizardSources>(
    effect: StepEffect,
    value: &Value,
    config: &mut Document,
    meta: &mut RunMetadata,
    sources: &S,
) -> Result<(), StepError> {
    let name = value_text(value).unwrap_or_default();
    match effect {
        StepEffect::ApplyProfile => {
            if name.is_empty() || name == NO_PROFILE {
                return Ok(());
            }
            let profile = sources
                .profile_config(&name)
                .await
                .map_err(|e| StepError::SideEffect(e.to_string()))?;
            match profile {
                Some(profile) => {
                    info!(target: "hubsh::wizard", "Applied profile '{}'", name);
                    config.merge(profile);
                }
                None => warn!(target: "hubsh::wizard", "Unknown profile '{}', nothing applied", name),
            }
            meta.set(meta_keys::PROFILE_NAME, name);
        }
        StepEffect::LoadExistingConfig => {
            if name.is_empty() {
                return Err(StepError::SideEffect("Repo name is required".to_string()));
            }
            let existing = sources
                .existing_config(&name)
                .await
                .map_err(|e| StepError::SideEffect(e.to_string()))?;
            info!(target: "hubsh::wizard", "Loaded existing config for '{}'", name);
            *config = existing;
            meta.set(meta_keys::REPO_NAME, name);
        }
    }
    Ok(())
}
