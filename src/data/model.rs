use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::error::QueryError;

// ---------------------------------------------------------------------------
// QuestionType – the type tag of a schema row
// ---------------------------------------------------------------------------

/// How respondents answer a question, which decides how its cells are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum QuestionType {
    /// One atomic value per respondent.
    #[serde(rename = "SC")]
    SingleChoice,
    /// Several values per respondent, joined by `;`.
    #[serde(rename = "MC")]
    MultipleChoice,
    /// Free-form text.
    #[serde(rename = "TE")]
    TextEntry,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::TextEntry,
    ];

    /// Short tag used in schema files and on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "SC",
            QuestionType::MultipleChoice => "MC",
            QuestionType::TextEntry => "TE",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "Single Choice",
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::TextEntry => "Text Entry",
        }
    }
}

impl FromStr for QuestionType {
    type Err = QueryError;

    /// Tags are matched case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SC" => Ok(QuestionType::SingleChoice),
            "MC" => Ok(QuestionType::MultipleChoice),
            "TE" => Ok(QuestionType::TextEntry),
            _ => Err(QueryError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Question – one row of the schema table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub column: String,
    pub question_text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

// ---------------------------------------------------------------------------
// SurveySchema – the complete question list
// ---------------------------------------------------------------------------

/// Ordered question metadata with a lookup index on the column name.
#[derive(Debug, Clone, Default)]
pub struct SurveySchema {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl SurveySchema {
    /// Build the schema, rejecting duplicate column names.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self> {
        let mut index = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            if index.insert(q.column.clone(), i).is_some() {
                bail!("duplicate question column '{}' in schema", q.column);
            }
        }
        Ok(SurveySchema { questions, index })
    }

    /// Questions in file order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, column: &str) -> Option<&Question> {
        self.index.get(column).map(|&i| &self.questions[i])
    }

    pub fn count_of(&self, question_type: QuestionType) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type == question_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Respondent – one row of the response table
// ---------------------------------------------------------------------------

/// Raw cell values of one participant, positionally aligned with
/// [`ResponseTable::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Respondent {
    pub cells: Vec<String>,
}

// ---------------------------------------------------------------------------
// ResponseTable – every respondent row
// ---------------------------------------------------------------------------

/// The loaded responses. Read-only once constructed.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    respondents: Vec<Respondent>,
}

impl ResponseTable {
    /// Build the table, checking header uniqueness and row widths.
    pub fn from_rows(columns: Vec<String>, respondents: Vec<Respondent>) -> Result<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if index.insert(col.clone(), i).is_some() {
                bail!("duplicate response column '{col}'");
            }
        }
        for (row, r) in respondents.iter().enumerate() {
            if r.cells.len() != columns.len() {
                bail!(
                    "response row {row} has {} values but there are {} columns",
                    r.cells.len(),
                    columns.len()
                );
            }
        }
        Ok(ResponseTable {
            columns,
            index,
            respondents,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn respondents(&self) -> &[Respondent] {
        &self.respondents
    }

    /// Raw value at (`row`, `column_idx`).
    pub fn cell(&self, row: usize, column_idx: usize) -> &str {
        &self.respondents[row].cells[column_idx]
    }

    /// Number of respondents.
    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }
}
