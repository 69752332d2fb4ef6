//! Logging setup.
//!
//! Logs are written to stderr so they never interleave with rendered output.
//! The level comes from one of five presets picked by CLI flags, refined by
//! repeated `--log target=level` overrides. `RUST_LOG`, when set, replaces
//! both.

use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Prefix every short override target is placed under.
const TARGET_ROOT: &str = "hubsh";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: '{}'. Use 'text' or 'json'.", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup line and problems only
    #[default]
    Production,
    /// What the shell is doing: registry loads, wizard sessions, commands run
    Verbose,
    /// Resolution decisions and subprocess details
    Debug,
    /// Everything, dependencies included
    Trace,
    /// Errors, plus hubsh warnings
    Quiet,
}

impl LogPreset {
    /// Pick a preset from the CLI flags. The quietest flag wins.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => LogPreset::Quiet,
            (_, true, ..) => LogPreset::Trace,
            (_, _, true, _) => LogPreset::Debug,
            (_, _, _, true) => LogPreset::Verbose,
            _ => LogPreset::Production,
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            LogPreset::Production => &["warn", "hubsh::startup=info", "hubsh::resolve=off"],
            LogPreset::Verbose => &["warn", "hubsh=info"],
            LogPreset::Debug => &["warn", "hubsh=debug"],
            LogPreset::Trace => &["info", "hubsh=trace"],
            LogPreset::Quiet => &["error", "hubsh=warn"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// `(target, level)` in the order given; later entries win.
    pub overrides: Vec<(String, Level)>,
    /// Override arguments that could not be parsed.
    pub rejected: Vec<String>,
    pub format: LogFormat,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            preset: LogPreset::Production,
            overrides: Vec::new(),
            rejected: Vec::new(),
            format: LogFormat::Text,
            ansi: true,
        }
    }
}

impl LogConfig {
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let mut config = Self {
            preset: LogPreset::from_flags(verbose, debug, trace, quiet),
            format,
            ..Self::default()
        };

        for part in log_overrides.iter().flat_map(|arg| arg.split(',')) {
            match parse_override(part) {
                Some(directive) => config.overrides.push(directive),
                None => config.rejected.push(part.trim().to_string()),
            }
        }
        config
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Preset directives, minus any target an override replaces, then the
    /// overrides (last one per target).
    pub fn directives(&self) -> String {
        let mut overrides: Vec<&(String, Level)> = Vec::new();
        for entry in self.overrides.iter().rev() {
            if !overrides.iter().any(|(target, _)| *target == entry.0) {
                overrides.push(entry);
            }
        }
        overrides.reverse();

        let overridden = |directive: &&str| {
            let target = directive.split('=').next().unwrap_or_default();
            overrides.iter().any(|(t, _)| t == target)
        };
        self.preset
            .directives()
            .iter()
            .filter(|d| !overridden(*d))
            .map(|d| d.to_string())
            .chain(
                overrides
                    .iter()
                    .map(|(target, level)| format!("{}={}", target, level.as_str().to_lowercase())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives()).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// `wizard=debug` becomes `("hubsh::wizard", DEBUG)`; `hubsh...` targets
/// are kept as written.
fn parse_override(part: &str) -> Option<(String, Level)> {
    let (target, level) = part.split_once('=')?;
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    let level = match level.trim().to_lowercase().as_str() {
        "warning" => Level::WARN,
        other => Level::from_str(other).ok()?,
    };

    let target = if target == TARGET_ROOT || target.starts_with("hubsh::") {
        target.to_string()
    } else {
        format!("{}::{}", TARGET_ROOT, target)
    };
    Some((target, level))
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let filter = config.build_filter();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(config.ansi)
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(args: &[&str]) -> LogConfig {
        LogConfig::from_cli(
            false,
            false,
            false,
            false,
            args.iter().map(|a| a.to_string()).collect(),
            LogFormat::Text,
        )
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_quietest_flag_wins() {
        assert_eq!(LogPreset::from_flags(true, true, true, true), LogPreset::Quiet);
        assert_eq!(LogPreset::from_flags(true, true, true, false), LogPreset::Trace);
        assert_eq!(LogPreset::from_flags(true, true, false, false), LogPreset::Debug);
        assert_eq!(LogPreset::from_flags(true, false, false, false), LogPreset::Verbose);
        assert_eq!(LogPreset::from_flags(false, false, false, false), LogPreset::Production);
    }

    #[test]
    fn test_short_targets_are_prefixed() {
        let config = overrides(&["wizard=debug", "runner=TRACE,hubsh::registry=warning"]);
        assert_eq!(
            config.overrides,
            vec![
                ("hubsh::wizard".to_string(), Level::DEBUG),
                ("hubsh::runner".to_string(), Level::TRACE),
                ("hubsh::registry".to_string(), Level::WARN),
            ]
        );
        assert!(config.rejected.is_empty());
    }

    #[test]
    fn test_bad_overrides_are_rejected() {
        let config = overrides(&["repl=loud", "=info", "resolve"]);
        assert!(config.overrides.is_empty());
        assert_eq!(config.rejected, vec!["repl=loud", "=info", "resolve"]);
    }

    #[test]
    fn test_directives_append_overrides() {
        let config = overrides(&["resolve=debug", "repl=info", "repl=trace"]);
        assert_eq!(
            config.directives(),
            "warn,hubsh::startup=info,hubsh::resolve=debug,hubsh::repl=trace"
        );
    }
}
