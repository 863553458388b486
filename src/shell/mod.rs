//! Line-oriented shell over a [`Survey`].
//!
//! ```text
//! input line ─► tokenize ─► Command::parse ─► Survey query ─► render (text | json)
//! ```
//!
//! Query errors and usage mistakes are printed and the loop carries on; only
//! `quit`/`exit`, end of input, or a failing writer end it.

pub mod command;
pub mod render;
pub mod tokenize;

use std::io::{self, BufRead, Write};

use log::debug;
use serde_json::json;
use thiserror::Error;

use crate::config::OutputFormat;
use crate::data::model::QuestionType;
use crate::error::QueryError;
use crate::query::Survey;
use crate::state::ShellState;

use command::{Command, ParseError};
use tokenize::split_command_line;

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
enum StepError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct Shell<'a, W: Write> {
    state: ShellState<'a>,
    out: W,
}

impl<'a, W: Write> Shell<'a, W> {
    pub fn new(survey: &'a Survey, format: OutputFormat, out: W) -> Self {
        Self {
            state: ShellState::new(survey, format),
            out,
        }
    }

    pub fn state(&self) -> &ShellState<'a> {
        &self.state
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Read and execute commands until `quit` or end of input.
    ///
    /// In interactive mode a banner and a prompt are printed; otherwise lines
    /// starting with `#` are skipped as comments.
    pub fn run<R: BufRead>(&mut self, input: R, interactive: bool) -> io::Result<()> {
        if interactive {
            writeln!(self.out, "{}", "=".repeat(80))?;
            writeln!(self.out, "SURVEY EXPLORER")?;
            writeln!(self.out, "{}", "=".repeat(80))?;
            writeln!(self.out, "Type 'help' for available commands, 'quit' to exit")?;
        }

        let mut lines = input.lines();
        loop {
            if interactive {
                write!(
                    self.out,
                    "\nsurvey [{}: {}]> ",
                    self.state.current_label(),
                    self.state.current().len()
                )?;
                self.out.flush()?;
            }

            let Some(line) = lines.next() else {
                if interactive {
                    writeln!(self.out, "\nGoodbye!")?;
                }
                break;
            };
            let line = line?;
            if !interactive && line.trim_start().starts_with('#') {
                continue;
            }

            if self.execute_line(&line)? == Control::Exit {
                writeln!(self.out, "Goodbye!")?;
                break;
            }
        }
        self.out.flush()
    }

    /// Parse and execute one line.
    pub fn execute_line(&mut self, line: &str) -> io::Result<Control> {
        let words = split_command_line(line);
        match Command::parse(&words) {
            Ok(None) => Ok(Control::Continue),
            Ok(Some(command)) => {
                debug!("Executing {command:?}");
                match self.execute(command) {
                    Ok(control) => Ok(control),
                    Err(StepError::Query(e)) => {
                        writeln!(self.out, "Error: {e}")?;
                        Ok(Control::Continue)
                    }
                    Err(StepError::Io(e)) => Err(e),
                }
            }
            Err(e @ ParseError::UnknownCommand(_)) => {
                writeln!(self.out, "{e}")?;
                writeln!(self.out, "Type 'help' for available commands")?;
                Ok(Control::Continue)
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Control::Continue)
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<Control, StepError> {
        let survey = self.state.survey;
        let format = self.state.format;
        let out: &mut dyn Write = &mut self.out;

        match command {
            Command::Quit => return Ok(Control::Exit),
            Command::Help => render::help(out)?,
            Command::Structure { question_type } => {
                let filter = question_type
                    .as_deref()
                    .map(|t| t.parse::<QuestionType>())
                    .transpose()?;
                let questions = survey.list_questions(question_type.as_deref())?;
                match format {
                    OutputFormat::Text => render::structure(out, &questions, filter)?,
                    OutputFormat::Json => render::json(out, &questions)?,
                }
            }
            Command::Search { term } => {
                let questions = survey.search_questions(&term, false);
                match format {
                    OutputFormat::Text => render::search_results(out, &term, &questions)?,
                    OutputFormat::Json => render::json(out, &questions)?,
                }
            }
            Command::Info { column } => {
                let question = survey.question_info(&column)?;
                match format {
                    OutputFormat::Text => render::question(out, question)?,
                    OutputFormat::Json => render::json(out, question)?,
                }
            }
            Command::Options { column } => {
                let options = survey.unique_options_in(self.state.current(), &column)?;
                match format {
                    OutputFormat::Text => render::options(out, &column, &options)?,
                    OutputFormat::Json => render::json(out, &options)?,
                }
            }
            Command::Dist {
                column,
                top_n,
                invalid_top_n,
            } => {
                if let Some(raw) = invalid_top_n {
                    writeln!(out, "Warning: invalid number '{raw}' for topN, showing all results")?;
                }
                let dist = survey.distribution(&column, Some(self.state.current()), top_n)?;
                match format {
                    OutputFormat::Text => render::distribution(out, &dist)?,
                    OutputFormat::Json => render::json(out, &dist)?,
                }
            }
            Command::Subset {
                column,
                value,
                mode,
            } => {
                let n = self.state.apply_subset(&column, &value, mode)?;
                let label = self.state.current_label();
                match format {
                    OutputFormat::Text => {
                        writeln!(out, "\nCreated subset with {n} respondents")?;
                        writeln!(out, "Filter: {label}")?;
                    }
                    OutputFormat::Json => {
                        render::json(out, &json!({ "filter": label, "respondents": n }))?
                    }
                }
            }
            Command::Reset => {
                self.state.reset();
                writeln!(
                    out,
                    "Back to the full dataset ({} respondents)",
                    self.state.current().len()
                )?;
            }
            Command::Format(new_format) => {
                self.state.format = new_format;
                writeln!(out, "Output format: {new_format:?}")?;
            }
            Command::Summary => {
                let stats = survey.summary_stats();
                match format {
                    OutputFormat::Text => render::summary(out, &stats)?,
                    OutputFormat::Json => render::json(out, &stats)?,
                }
            }
        }
        Ok(Control::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::data::filter::MissingPolicy;
    use crate::data::model::{Question, Respondent, ResponseTable, SurveySchema};

    fn survey() -> Survey {
        let schema = SurveySchema::from_questions(vec![
            Question {
                column: "Age".into(),
                question_text: "What is your age?".into(),
                question_type: QuestionType::SingleChoice,
            },
            Question {
                column: "Lang".into(),
                question_text: "Which languages have you worked with?".into(),
                question_type: QuestionType::MultipleChoice,
            },
        ])
        .unwrap();
        let rows = [["25-34", "Python;JavaScript"], ["25-34", "Python"], ["", "Go"]];
        let responses = ResponseTable::from_rows(
            vec!["Age".into(), "Lang".into()],
            rows.iter()
                .map(|r| Respondent {
                    cells: r.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        )
        .unwrap();
        Survey::new(schema, responses, MissingPolicy::default())
    }

    fn run_script(survey: &Survey, script: &str) -> String {
        let mut shell = Shell::new(survey, OutputFormat::Text, Vec::new());
        shell.run(Cursor::new(script), false).unwrap();
        String::from_utf8(shell.into_inner()).unwrap()
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let survey = survey();
        let out = run_script(&survey, "info Salary\nbogus\nstructure XX\ninfo Age\n");
        assert!(out.contains("Error: unknown column 'Salary'"));
        assert!(out.contains("Unknown command: bogus"));
        assert!(out.contains("Type 'help' for available commands"));
        assert!(out.contains("Error: unknown question type 'XX'"));
        assert!(out.contains("Question: Age (SC)"));
    }

    #[test]
    fn quit_stops_reading() {
        let survey = survey();
        let out = run_script(&survey, "quit\ninfo Age\n");
        assert!(out.contains("Goodbye!"));
        assert!(!out.contains("Question: Age"));
    }

    #[test]
    fn subset_narrows_following_distributions() {
        let survey = survey();
        let mut shell = Shell::new(&survey, OutputFormat::Text, Vec::new());
        shell.execute_line("subset Lang Python").unwrap();
        assert_eq!(shell.state().current().len(), 2);
        shell.execute_line("reset").unwrap();
        assert_eq!(shell.state().current().len(), 3);
        shell.execute_line("subset Lang java --contains").unwrap();
        assert_eq!(shell.state().current().len(), 1);

        let out = String::from_utf8(shell.into_inner()).unwrap();
        assert!(out.contains("Created subset with 2 respondents"));
        assert!(out.contains("Filter: Lang~'java'"));
    }

    #[test]
    fn json_output() {
        let survey = survey();
        let out = run_script(&survey, "# comment\nformat json\ndist Lang\n");
        let start = out.find('{').unwrap();
        let value: serde_json::Value = serde_json::from_str(&out[start..]).unwrap();
        assert_eq!(value["column"], "Lang");
        assert_eq!(value["question_type"], "MC");
        assert_eq!(value["valid_responses"], 3);
        assert_eq!(value["options"][0]["value"], "Python");
        assert_eq!(value["options"][0]["count"], 2);
    }

    #[test]
    fn invalid_top_n_warns_and_shows_everything() {
        let survey = survey();
        let out = run_script(&survey, "dist Lang lots\n");
        assert!(out.contains("Warning: invalid number 'lots'"));
        assert!(out.contains("JavaScript"));
        assert!(out.contains("Go"));
    }
}
