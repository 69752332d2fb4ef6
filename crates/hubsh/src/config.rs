//! Shell configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Project-level config file, looked up in the working directory.
pub const PROJECT_FILE: &str = ".hubsh.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cli: CliConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    /// Interpreter used as `python -m cihub`
    #[serde(default)]
    pub python_path: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default = "default_true")]
    pub show_duration: bool,
}

fn default_timeout_ms() -> u64 {
    120_000
}

fn default_true() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            python_path: None,
            default_timeout_ms: default_timeout_ms(),
            verbose: false,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_duration: true,
        }
    }
}

/// One file consulted while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub path: PathBuf,
    pub loaded: bool,
}

/// Merged configuration plus what went into it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub sources: Vec<ConfigSource>,
    /// Problems with individual files; never fatal.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.cli.default_timeout_ms)
    }

    /// Load the layered configuration for `cwd`, then apply environment
    /// overrides. `explicit` (from `--config`) wins over `$HUBSH_CONFIG`.
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> LoadedConfig {
        let global = dirs::config_dir().map(|dir| dir.join("hubsh").join("config.toml"));
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("HUBSH_CONFIG").map(PathBuf::from))
            .map(|path| if path.is_absolute() { path } else { cwd.join(path) });

        let mut layers = Vec::new();
        if let Some(global) = global {
            layers.push(("global", global));
        }
        layers.push(("project", cwd.join(PROJECT_FILE)));
        if let Some(explicit) = explicit {
            layers.push(("explicit", explicit));
        }

        let mut loaded = Self::load_layers(&layers);
        loaded
            .config
            .apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        loaded
    }

    /// Merge the given files in order, later files winning.
    pub fn load_layers(layers: &[(&'static str, PathBuf)]) -> LoadedConfig {
        let mut merged = toml::Table::new();
        let mut sources = Vec::new();
        let mut warnings = Vec::new();

        for (label, path) in layers {
            let mut source = ConfigSource {
                label: *label,
                path: path.clone(),
                loaded: false,
            };
            match std::fs::read_to_string(path) {
                Ok(content) => match content.parse::<toml::Table>() {
                    Ok(table) => {
                        debug!(target: "hubsh::config", "Loaded {} config from {:?}", label, path);
                        merge_tables(&mut merged, table);
                        source.loaded = true;
                    }
                    Err(e) => warnings.push(format!("{}: {}", path.display(), e)),
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warnings.push(format!("{}: {}", path.display(), e)),
            }
            sources.push(source);
        }

        let config = match toml::Value::Table(merged).try_into::<Config>() {
            Ok(config) => config,
            Err(e) => {
                warnings.push(format!("Invalid configuration: {}", e));
                Config::default()
            }
        };

        for warning in &warnings {
            warn!(target: "hubsh::config", "{}", warning);
        }

        LoadedConfig {
            config,
            sources,
            warnings,
        }
    }

    /// `CIHUB_PYTHON_PATH`, `HUBSH_DEBUG` and `NO_COLOR`.
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(python) = env("CIHUB_PYTHON_PATH") {
            self.cli.python_path = Some(python);
        }
        if env("HUBSH_DEBUG").is_some() {
            self.cli.verbose = true;
        }
        if env("NO_COLOR").is_some() {
            self.ui.color = false;
        }
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
