//! Tokenizer for lines typed at the shell prompt.

use crate::error::InputError;

/// Name of the underlying tool; a leading `cihub` token is stripped.
pub const TOOL_NAME: &str = "cihub";

/// One tokenized input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    /// The trimmed input line.
    pub raw: String,
    /// Leading command token, without any `/` prefix.
    pub command: String,
    /// Remaining tokens.
    pub args: Vec<String>,
    /// Whether the line was written as an explicit `/command`.
    pub is_slash: bool,
}

impl ParsedInput {
    /// `[command, args...]`
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.command.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Split a line into tokens, honouring quotes and backslash escapes.
///
/// Quote characters never appear in tokens. A trailing lone backslash is
/// dropped.
pub fn split_args(input: &str) -> Result<Vec<String>, InputError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            } else {
                current.push(ch);
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(InputError::MalformedInput {
            reason: "Unterminated quote in command",
        });
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Tokenize one line of user input.
pub fn parse_input(input: &str) -> Result<ParsedInput, InputError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(InputError::EmptyCommand {
            reason: "No command provided",
        });
    }

    if raw == "?" {
        return Ok(ParsedInput {
            raw: raw.to_string(),
            command: "help".to_string(),
            args: Vec::new(),
            is_slash: true,
        });
    }

    let mut tokens = split_args(raw)?;
    if tokens.first().map(String::as_str) == Some(TOOL_NAME) {
        tokens.remove(0);
        if tokens.is_empty() {
            return Err(InputError::EmptyCommand {
                reason: "Expected a subcommand after 'cihub'",
            });
        }
    }

    let mut tokens = tokens.into_iter();
    let Some(first) = tokens.next() else {
        return Err(InputError::EmptyCommand {
            reason: "No command token provided",
        });
    };

    let (command, is_slash) = match first.strip_prefix('/') {
        Some(rest) => (rest.to_string(), true),
        None => (first, false),
    };
    if command.is_empty() {
        return Err(InputError::EmptyCommand {
            reason: "Slash command requires a name",
        });
    }

    Ok(ParsedInput {
        raw: raw.to_string(),
        command,
        args: tokens.collect(),
        is_slash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_argument_is_one_token() {
        let parsed = parse_input(r#"/run --output-dir "build artifacts""#).unwrap();
        assert_eq!(parsed.command, "run");
        assert_eq!(parsed.args, vec!["--output-dir", "build artifacts"]);
        assert!(parsed.is_slash);
    }

    #[test]
    fn test_single_quotes_and_escapes() {
        let tokens = split_args(r#"a 'b c' d\ e "f\"g""#).unwrap();
        assert_eq!(tokens, vec!["a", "b c", "d e", "f\"g"]);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let parsed = parse_input("  check   --json\t--verbose  ").unwrap();
        assert_eq!(parsed.command, "check");
        assert_eq!(parsed.args, vec!["--json", "--verbose"]);
        assert!(!parsed.is_slash);
        assert_eq!(parsed.raw, "check   --json\t--verbose");
    }

    #[test]
    fn test_question_mark_is_help() {
        let parsed = parse_input(" ? ").unwrap();
        assert_eq!(parsed.command, "help");
        assert!(parsed.args.is_empty());
        assert!(parsed.is_slash);
    }

    #[test]
    fn test_question_mark_with_args_is_not_help() {
        let parsed = parse_input("? foo").unwrap();
        assert_eq!(parsed.command, "?");
    }

    #[test]
    fn test_tool_name_is_stripped() {
        let parsed = parse_input("cihub report build").unwrap();
        assert_eq!(parsed.command, "report");
        assert_eq!(parsed.args, vec!["build"]);
        assert!(!parsed.is_slash);
    }

    #[test]
    fn test_bare_tool_name_is_empty() {
        assert!(matches!(
            parse_input("cihub"),
            Err(InputError::EmptyCommand { .. })
        ));
    }

    #[test]
    fn test_bare_slash_is_empty() {
        assert_eq!(
            parse_input("/").unwrap_err(),
            InputError::EmptyCommand {
                reason: "Slash command requires a name"
            }
        );
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(matches!(
            parse_input("   \t "),
            Err(InputError::EmptyCommand { .. })
        ));
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        assert!(matches!(
            parse_input(r#"/new "acme/widgets"#),
            Err(InputError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_only_quotes_yields_no_command() {
        assert!(matches!(
            parse_input(r#""""#),
            Err(InputError::EmptyCommand { .. })
        ));
    }
}
