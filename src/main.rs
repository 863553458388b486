use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use survey_explorer::shell::Shell;
use survey_explorer::{OutputFormat, Survey, SurveyConfig};

#[derive(Parser)]
#[command(
    name = "survey-explorer",
    version,
    about = "Explore a tabular survey dataset from an interactive shell."
)]
struct Args {
    /// Question schema (.csv or .json) with `column`, `question_text` and `type`.
    schema: PathBuf,

    /// Respondent answers (.csv, .json or .parquet), one column per question.
    responses: PathBuf,

    /// Cell value counted as "no answer" (repeatable).
    #[arg(long = "null-marker", value_name = "MARKER", default_value = "NA")]
    null_markers: Vec<String>,

    /// Initial output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Read commands from a file instead of the terminal.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = SurveyConfig {
        null_markers: args.null_markers,
        output: args.format,
    };
    let survey = Survey::load(&args.schema, &args.responses, &config)?;
    info!(
        "Survey ready: {} questions, {} respondents",
        survey.schema().len(),
        survey.responses().len()
    );

    let mut shell = Shell::new(&survey, config.output, io::stdout().lock());
    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            shell.run(BufReader::new(file), false)?;
        }
        None => shell.run(io::stdin().lock(), true)?,
    }
    Ok(())
}
