use clap::ValueEnum;
use thiserror::Error;

use crate::config::OutputFormat;
use crate::data::filter::MatchMode;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `structure [type]`
    Structure { question_type: Option<String> },
    /// `search <term...>`
    Search { term: String },
    /// `info <column>`
    Info { column: String },
    /// `options <column>`
    Options { column: String },
    /// `dist <column> [topN]`
    Dist {
        column: String,
        top_n: Option<usize>,
        /// Raw `topN` argument that was not a number.
        invalid_top_n: Option<String>,
    },
    /// `subset <column> <value> [--contains]`
    Subset {
        column: String,
        value: String,
        mode: MatchMode,
    },
    Reset,
    /// `format text|json`
    Format(OutputFormat),
    Summary,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

const USAGE_SEARCH: &str = "search <term>";
const USAGE_INFO: &str = "info <column>";
const USAGE_OPTIONS: &str = "options <column>";
const USAGE_DIST: &str = "dist <column> [topN]";
const USAGE_SUBSET: &str = "subset <column> <value> [--contains]  (quote values with spaces)";
const USAGE_FORMAT: &str = "format text|json";

impl Command {
    /// Parse tokenized words. Returns `Ok(None)` for a blank line.
    pub fn parse(words: &[String]) -> Result<Option<Command>, ParseError> {
        let Some((cmd, args)) = words.split_first() else {
            return Ok(None);
        };

        let first = |usage| args.first().cloned().ok_or(ParseError::Usage(usage));

        let command = match cmd.to_lowercase().as_str() {
            "quit" | "exit" | "q" => Command::Quit,
            "help" | "h" | "?" => Command::Help,
            "summary" => Command::Summary,
            "reset" => Command::Reset,
            "structure" => Command::Structure {
                question_type: args.first().cloned(),
            },
            "search" => {
                if args.is_empty() {
                    return Err(ParseError::Usage(USAGE_SEARCH));
                }
                Command::Search {
                    term: args.join(" "),
                }
            }
            "info" => Command::Info {
                column: first(USAGE_INFO)?,
            },
            "options" => Command::Options {
                column: first(USAGE_OPTIONS)?,
            },
            "dist" | "distribution" => {
                let column = first(USAGE_DIST)?;
                let (top_n, invalid_top_n) = match args.get(1) {
                    None => (None, None),
                    Some(raw) => match raw.parse::<usize>() {
                        Ok(n) => (Some(n), None),
                        Err(_) => (None, Some(raw.clone())),
                    },
                };
                Command::Dist {
                    column,
                    top_n,
                    invalid_top_n,
                }
            }
            "subset" => {
                // The flag is only recognised as the last word.
                let (mode, rest) = match args.split_last() {
                    Some((last, rest)) if last == "--contains" => (MatchMode::Contains, rest),
                    _ => (MatchMode::Exact, args),
                };
                match rest {
                    [column, value @ ..] if !value.is_empty() => Command::Subset {
                        column: column.to_string(),
                        value: value.join(" "),
                        mode,
                    },
                    _ => return Err(ParseError::Usage(USAGE_SUBSET)),
                }
            }
            "format" => {
                let raw = first(USAGE_FORMAT)?;
                let format = OutputFormat::from_str(&raw, true)
                    .map_err(|_| ParseError::Usage(USAGE_FORMAT))?;
                Command::Format(format)
            }
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::tokenize::split_command_line;

    fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        Command::parse(&split_command_line(line))
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn quit_aliases() {
        for line in ["quit", "EXIT", "q"] {
            assert_eq!(parse(line), Ok(Some(Command::Quit)));
        }
    }

    #[test]
    fn search_joins_words() {
        assert_eq!(
            parse("search remote work"),
            Ok(Some(Command::Search {
                term: "remote work".into()
            }))
        );
        assert_eq!(parse("search"), Err(ParseError::Usage(USAGE_SEARCH)));
    }

    #[test]
    fn dist_top_n() {
        assert_eq!(
            parse("dist Age 5"),
            Ok(Some(Command::Dist {
                column: "Age".into(),
                top_n: Some(5),
                invalid_top_n: None,
            }))
        );
        assert_eq!(
            parse("distribution Age five"),
            Ok(Some(Command::Dist {
                column: "Age".into(),
                top_n: None,
                invalid_top_n: Some("five".into()),
            }))
        );
    }

    #[test]
    fn subset_with_quoted_value_and_contains_flag() {
        assert_eq!(
            parse(r#"subset MainBranch "I am a developer by profession""#),
            Ok(Some(Command::Subset {
                column: "MainBranch".into(),
                value: "I am a developer by profession".into(),
                mode: MatchMode::Exact,
            }))
        );
        assert_eq!(
            parse("subset Lang java --contains"),
            Ok(Some(Command::Subset {
                column: "Lang".into(),
                value: "java".into(),
                mode: MatchMode::Contains,
            }))
        );
        // Anywhere else the flag is part of the value.
        assert_eq!(
            parse("subset Flags --contains"),
            Err(ParseError::Usage(USAGE_SUBSET))
        );
        assert_eq!(
            parse(r#"subset Flags "--contains" --contains"#),
            Ok(Some(Command::Subset {
                column: "Flags".into(),
                value: "--contains".into(),
                mode: MatchMode::Contains,
            }))
        );
        assert_eq!(
            parse("subset Flags --contains x"),
            Ok(Some(Command::Subset {
                column: "Flags".into(),
                value: "--contains x".into(),
                mode: MatchMode::Exact,
            }))
        );
        assert_eq!(parse("subset Lang"), Err(ParseError::Usage(USAGE_SUBSET)));
    }

    #[test]
    fn format_and_unknown() {
        assert_eq!(parse("format JSON"), Ok(Some(Command::Format(OutputFormat::Json))));
        assert_eq!(parse("format xml"), Err(ParseError::Usage(USAGE_FORMAT)));
        assert_eq!(
            parse("frobnicate"),
            Err(ParseError::UnknownCommand("frobnicate".into()))
        );
    }
}
