//! Per-session shell state.

use crate::config::Config;
use crate::render::Renderer;
use hubsh_core::{CihubSources, RegistrySlot, WizardSession};

/// Everything one interactive session owns.
pub struct ShellState {
    pub config: Config,
    pub sources: CihubSources,
    pub registry: RegistrySlot,
    /// The wizard currently taking input, if any.
    pub wizard: Option<WizardSession>,
    pub renderer: Renderer,
}

impl ShellState {
    pub fn new(config: Config, sources: CihubSources) -> Self {
        let renderer = Renderer::new(config.ui.color);
        Self {
            config,
            sources,
            registry: RegistrySlot::new(),
            wizard: None,
            renderer,
        }
    }

    pub fn in_wizard(&self) -> bool {
        self.wizard.as_ref().is_some_and(WizardSession::is_active)
    }

    pub fn prompt(&self) -> &'static str {
        if self.in_wizard() {
            "wizard> "
        } else {
            "hubsh> "
        }
    }
}
