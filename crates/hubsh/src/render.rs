//! Plain-text rendering of command results, help listings and wizard prompts.

use hubsh_core::wizard::StepKind;
use hubsh_core::StepPrompt;
use hubsh_types::{CommandResult, HelpTable, Severity};

/// One block of output, the unit the loop prints after each line.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub summary: String,
    pub status: Option<Severity>,
    pub details: Vec<String>,
    pub problems: Vec<(Severity, String)>,
    pub suggestions: Vec<String>,
    pub tables: Vec<HelpTable>,
}

impl Output {
    pub fn new(summary: impl Into<String>, status: Option<Severity>) -> Self {
        Self {
            summary: summary.into(),
            status,
            details: Vec::new(),
            problems: Vec::new(),
            suggestions: Vec::new(),
            tables: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn with_tables(mut self, tables: Vec<HelpTable>) -> Self {
        self.tables = tables;
        self
    }

    /// A failure with a single error problem.
    pub fn failure(summary: impl Into<String>, message: impl Into<String>) -> Self {
        let mut output = Self::new(summary, Some(Severity::Error));
        output.problems.push((Severity::Error, message.into()));
        output
    }

    pub fn from_result(result: &CommandResult, show_duration: bool) -> Self {
        let mut output = Self::new(
            result.summary.clone().unwrap_or_else(|| "Command complete".to_string()),
            Some(result.severity()),
        );

        output.problems = result
            .problems
            .iter()
            .map(|problem| {
                let severity = match problem.severity.as_deref() {
                    Some("warning") => Severity::Warning,
                    Some("info") => Severity::Info,
                    _ => Severity::Error,
                };
                let message = problem.text().unwrap_or("Problem reported").to_string();
                (severity, message)
            })
            .collect();

        output.suggestions = result
            .suggestions
            .iter()
            .map(|s| s.text().unwrap_or("Suggestion available").to_string())
            .collect();

        if let Some(command) = &result.command {
            output.details.push(format!("command: {}", command));
        }
        if let Some(status) = &result.status {
            output.details.push(format!("status: {}", status));
        }
        if show_duration {
            if let Some(ms) = result.duration_ms {
                output.details.push(format!("duration: {}ms", ms));
            }
        }
        if let Some(raw) = result.data_field("raw_output").and_then(|v| v.as_str()) {
            let lines: Vec<&str> = raw.lines().filter(|l| !l.is_empty()).collect();
            if !lines.is_empty() {
                if !output.details.is_empty() {
                    output.details.push(String::new());
                }
                output.details.extend(lines.into_iter().map(String::from));
            }
        }
        output
    }
}

fn status_label(status: Severity) -> &'static str {
    match status {
        Severity::Ok => "OK",
        Severity::Info => "INFO",
        Severity::Warning => "WARNING",
        Severity::Error => "ERROR",
    }
}

/// Writes `Output` blocks as text, with ANSI color when enabled.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

const RED: &str = "31";
const GREEN: &str = "32";
const YELLOW: &str = "33";
const BLUE: &str = "34";
const CYAN: &str = "36";
const DIM: &str = "2";

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn severity_color(status: Severity) -> &'static str {
        match status {
            Severity::Ok => GREEN,
            Severity::Info => BLUE,
            Severity::Warning => YELLOW,
            Severity::Error => RED,
        }
    }

    pub fn output(&self, output: &Output) -> String {
        let mut lines = Vec::new();
        match output.status {
            Some(status) => lines.push(self.paint(
                Self::severity_color(status),
                &format!("[{}] {}", status_label(status), output.summary),
            )),
            None => lines.push(output.summary.clone()),
        }

        if !output.details.is_empty() {
            lines.push(String::new());
            lines.extend(output.details.iter().map(|line| self.paint(DIM, line)));
        }

        if !output.problems.is_empty() {
            lines.push(String::new());
            lines.push(self.paint(RED, "Problems"));
            for (severity, message) in &output.problems {
                let marker = if *severity == Severity::Info { "i" } else { "!" };
                lines.push(format!(
                    "{} {}",
                    self.paint(Self::severity_color(*severity), marker),
                    message
                ));
            }
        }

        if !output.suggestions.is_empty() {
            lines.push(String::new());
            lines.push(self.paint(GREEN, "Suggestions"));
            lines.extend(output.suggestions.iter().map(|s| format!("- {}", s)));
        }

        for table in &output.tables {
            lines.push(String::new());
            lines.push(self.paint(CYAN, &table.title));
            lines.extend(table_lines(table));
        }

        lines.join("\n")
    }

    pub fn prompt(&self, prompt: &StepPrompt) -> String {
        let mut lines = vec![
            self.paint(CYAN, &format!("Wizard: {}", prompt.title)),
            self.paint(DIM, &prompt.progress_label()),
            String::new(),
            prompt.question.to_string(),
        ];
        if prompt.kind == StepKind::Select {
            for (i, choice) in prompt.choices.iter().enumerate() {
                lines.push(format!("  {}. {}", i + 1, choice));
            }
        }
        if let Some(default) = &prompt.default {
            lines.push(self.paint(DIM, &format!("Default: {}", default)));
        }
        lines.push(self.paint(DIM, "Type /back or /cancel anytime."));
        lines.join("\n")
    }
}

/// Boxed table: divider, header row, divider, rows, divider.
pub fn table_lines(table: &HelpTable) -> Vec<String> {
    let columns = table.headers.len();
    let rows: Vec<Vec<&str>> = table
        .rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let divider = format!(
        "+-{}-+",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    let format_row = |cells: &[&str]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    let mut lines = vec![divider.clone(), format_row(&headers), divider.clone()];
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.push(divider);
    lines
}
