use std::io::{self, Write};

use serde::Serialize;

use crate::data::model::{Question, QuestionType};
use crate::query::{Distribution, SummaryStats};

const RULE_WIDTH: usize = 80;
const OPTION_WIDTH: usize = 50;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn heading(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

fn rule(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Cut `s` to `width` characters, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Thousands separators for counts.
fn grouped(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

// ---------------------------------------------------------------------------
// Question listings
// ---------------------------------------------------------------------------

pub fn structure(
    out: &mut dyn Write,
    questions: &[&Question],
    question_type: Option<QuestionType>,
) -> io::Result<()> {
    let title = match question_type {
        Some(t) => format!("SURVEY STRUCTURE ({} questions only)", t.tag()),
        None => "SURVEY STRUCTURE".to_string(),
    };
    heading(out, &title)?;
    for (i, q) in questions.iter().enumerate() {
        writeln!(out, "\n{}. {} ({})", i + 1, q.column, q.question_type)?;
        writeln!(out, "   {}", q.question_text)?;
    }
    writeln!(out, "\nTotal questions: {}", questions.len())
}

pub fn search_results(out: &mut dyn Write, term: &str, questions: &[&Question]) -> io::Result<()> {
    if questions.is_empty() {
        return writeln!(out, "\nNo questions found matching '{term}'");
    }
    writeln!(out, "\nFound {} question(s) matching '{term}':", questions.len())?;
    writeln!(out, "{}", "-".repeat(60))?;
    for q in questions {
        writeln!(out, "\n{} ({})", q.column, q.question_type)?;
        writeln!(out, "   {}", q.question_text)?;
    }
    Ok(())
}

pub fn question(out: &mut dyn Write, q: &Question) -> io::Result<()> {
    writeln!(out, "\nQuestion: {} ({})", q.column, q.question_type)?;
    writeln!(out, "Type: {}", q.question_type.label())?;
    writeln!(out, "Text: {}", q.question_text)
}

pub fn options(out: &mut dyn Write, column: &str, options: &[String]) -> io::Result<()> {
    writeln!(out, "\nUnique options for '{column}' ({} total):", options.len())?;
    for (i, option) in options.iter().enumerate() {
        writeln!(out, "{:3}. {option}", i + 1)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

pub fn distribution(out: &mut dyn Write, dist: &Distribution) -> io::Result<()> {
    heading(out, "ANSWER DISTRIBUTION")?;
    writeln!(out, "Column: {}", dist.column)?;
    writeln!(out, "Question: {}", dist.question_text)?;
    writeln!(out, "Type: {}", dist.question_type.label())?;
    writeln!(out, "Total Respondents: {}", grouped(dist.total_respondents))?;
    writeln!(out, "Valid Responses: {}", grouped(dist.valid_responses))?;
    writeln!(out, "Response Rate: {:.1}%", dist.response_rate())?;
    if dist.question_type == QuestionType::MultipleChoice {
        writeln!(out, "Total Selections: {}", grouped(dist.total_selections))?;
    }

    writeln!(out)?;
    rule(out)?;
    writeln!(
        out,
        "{:<w$} {:>10} {:>10}",
        "Option",
        "Count",
        "Percentage",
        w = OPTION_WIDTH
    )?;
    rule(out)?;
    if dist.is_empty() {
        writeln!(out, "(no responses)")?;
    }
    for opt in &dist.options {
        let bar = "█".repeat((opt.percentage / 2.0) as usize);
        writeln!(
            out,
            "{:<w$} {:>10} {:>9.1}% {bar}",
            truncate(&opt.value, OPTION_WIDTH),
            grouped(opt.count),
            opt.percentage,
            w = OPTION_WIDTH
        )?;
    }
    rule(out)
}

pub fn summary(out: &mut dyn Write, stats: &SummaryStats) -> io::Result<()> {
    heading(out, "SURVEY SUMMARY")?;
    writeln!(out, "Total Questions: {}", stats.total_questions)?;
    writeln!(out, "Total Respondents: {}", grouped(stats.total_respondents))?;
    writeln!(out, "Missing Cells: {}", grouped(stats.missing_cells))?;
    writeln!(out, "Null Markers: {}", stats.null_markers.join(", "))?;

    writeln!(out, "\nQuestion Types:")?;
    for (t, count) in &stats.questions_by_type {
        writeln!(out, "  {:<16} {count}", format!("{}:", t.label()))?;
    }

    writeln!(out, "\nAverage Response Rates:")?;
    writeln!(out, "  {:<16} {:.1}%", "All questions:", stats.average_response_rate)?;
    for (t, rate) in &stats.response_rate_by_type {
        writeln!(out, "  {:<16} {rate:.1}%", format!("{}:", t.label()))?;
    }
    Ok(())
}

pub fn help(out: &mut dyn Write) -> io::Result<()> {
    const HELP: &str = "\
Data Exploration:
  summary                          Show survey summary statistics
  structure [type]                 Show survey structure (optional: SC, MC, TE)

Search & Discovery:
  search <term>                    Search questions by column name or text
  info <column>                    Show a single question
  options <column>                 List unique options of a question

Analysis:
  dist <column> [n]                Show answer distribution (optional: top n)
  subset <column> <value>          Narrow the session to matching respondents
  subset <column> <value> --contains
                                   Same, matching by case-insensitive substring
  reset                            Return to the full dataset

Utility:
  format text|json                 Switch output format
  help                             Show this help message
  quit | exit                      Exit

Examples:
  structure SC
  search language
  dist Age 5
  subset MainBranch \"I am a developer by profession\"";

    heading(out, "SURVEY EXPLORER - COMMANDS")?;
    writeln!(out, "{}", HELP)
}
