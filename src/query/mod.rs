//! The query engine: structure, search, subset and distribution queries over
//! a loaded survey.
//!
//! A [`Survey`] owns the schema and response tables and never mutates them.
//! Subsets are [`RespondentSet`]s: lists of row indices borrowed from the
//! survey, so deriving one never copies or alters respondent rows.

pub mod distribution;
pub mod summary;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use log::{debug, info, warn};

use crate::config::SurveyConfig;
use crate::data::filter::{matching_indices, mc_tokens, MatchMode, MissingPolicy};
use crate::data::loader::{load_responses, load_schema};
use crate::data::model::{Question, QuestionType, Respondent, ResponseTable, SurveySchema};
use crate::error::QueryError;

pub use distribution::{Distribution, OptionShare};
pub use summary::SummaryStats;

// ---------------------------------------------------------------------------
// RespondentSet – a read-only view of some respondent rows
// ---------------------------------------------------------------------------

/// Rows of a survey's response table, in table order.
#[derive(Debug, Clone)]
pub struct RespondentSet<'a> {
    table: &'a ResponseTable,
    rows: Vec<usize>,
}

impl<'a> RespondentSet<'a> {
    /// Row indices into the response table.
    pub fn indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn respondents(&self) -> impl Iterator<Item = &'a Respondent> + '_ {
        let all = self.table.respondents();
        self.rows.iter().map(move |&i| &all[i])
    }

    /// Raw cells of one column for every member; empty when `column_idx` is
    /// `None`.
    fn cells(&self, column_idx: Option<usize>) -> impl Iterator<Item = &'a str> + '_ {
        let table = self.table;
        column_idx
            .into_iter()
            .flat_map(move |col| self.rows.iter().map(move |&row| table.cell(row, col)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Survey – schema + responses
// ---------------------------------------------------------------------------

/// A loaded survey, queryable for its lifetime.
#[derive(Debug, Clone)]
pub struct Survey {
    schema: SurveySchema,
    responses: ResponseTable,
    missing: MissingPolicy,
}

impl Survey {
    /// Pair a schema with its responses.
    ///
    /// Questions without a response column are kept and read as unanswered;
    /// response columns without a question are not queryable.
    pub fn new(schema: SurveySchema, responses: ResponseTable, missing: MissingPolicy) -> Self {
        for q in schema.questions() {
            if responses.column_index(&q.column).is_none() {
                warn!("Question '{}' has no column in the response table", q.column);
            }
        }
        let unmapped = responses
            .columns()
            .iter()
            .filter(|c| schema.get(c).is_none())
            .count();
        if unmapped > 0 {
            info!("{unmapped} response columns are not described by the schema and will be ignored");
        }

        Survey {
            schema,
            responses,
            missing,
        }
    }

    /// Load both tables from disk. Any failure here is fatal for the survey.
    pub fn load(schema_path: &Path, responses_path: &Path, config: &SurveyConfig) -> Result<Self> {
        let schema = load_schema(schema_path)?;
        let responses = load_responses(responses_path)?;
        Ok(Survey::new(schema, responses, config.missing_policy()))
    }

    pub fn schema(&self) -> &SurveySchema {
        &self.schema
    }

    pub fn responses(&self) -> &ResponseTable {
        &self.responses
    }

    pub fn missing_policy(&self) -> &MissingPolicy {
        &self.missing
    }

    // -- structure & search --

    /// Questions in schema order, optionally restricted to one type tag.
    pub fn list_questions(&self, type_filter: Option<&str>) -> Result<Vec<&Question>, QueryError> {
        let wanted = type_filter
            .map(|t| t.parse::<QuestionType>())
            .transpose()?;
        Ok(self
            .schema
            .questions()
            .iter()
            .filter(|q| wanted.map_or(true, |t| q.question_type == t))
            .collect())
    }

    /// Questions whose column name or text contains `term`.
    pub fn search_questions(&self, term: &str, case_sensitive: bool) -> Vec<&Question> {
        let needle = if case_sensitive {
            term.to_string()
        } else {
            term.to_lowercase()
        };
        let fold = |s: &str| {
            if case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        self.schema
            .questions()
            .iter()
            .filter(|q| fold(&q.column).contains(&needle) || fold(&q.question_text).contains(&needle))
            .collect()
    }

    pub fn question_info(&self, column: &str) -> Result<&Question, QueryError> {
        self.schema
            .get(column)
            .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))
    }

    // -- options --

    /// Distinct answers observed for `column`, sorted.
    pub fn unique_options(&self, column: &str) -> Result<Vec<String>, QueryError> {
        self.unique_options_in(&self.all_respondents(), column)
    }

    /// Distinct answers observed for `column` within `set`, sorted.
    ///
    /// Multiple-choice cells contribute each of their selections.
    pub fn unique_options_in(&self, set: &RespondentSet<'_>, column: &str) -> Result<Vec<String>, QueryError> {
        let question = self.question_info(column)?;
        let col = set.table.column_index(column);

        let mut options: BTreeSet<&str> = BTreeSet::new();
        for raw in set.cells(col).filter(|raw| !self.missing.is_missing(raw)) {
            match question.question_type {
                QuestionType::MultipleChoice => options.extend(mc_tokens(raw, &self.missing)),
                QuestionType::SingleChoice | QuestionType::TextEntry => {
                    options.insert(raw.trim());
                }
            }
        }
        Ok(options.into_iter().map(str::to_string).collect())
    }

    // -- subsets --

    /// Every respondent.
    pub fn all_respondents(&self) -> RespondentSet<'_> {
        RespondentSet {
            table: &self.responses,
            rows: (0..self.responses.len()).collect(),
        }
    }

    /// Respondents whose answer to `column` matches `value`.
    pub fn create_subset(
        &self,
        column: &str,
        value: &str,
        mode: MatchMode,
    ) -> Result<RespondentSet<'_>, QueryError> {
        self.refine_subset(&self.all_respondents(), column, value, mode)
    }

    /// Members of `base` whose answer to `column` matches `value`.
    pub fn refine_subset<'a>(
        &'a self,
        base: &RespondentSet<'a>,
        column: &str,
        value: &str,
        mode: MatchMode,
    ) -> Result<RespondentSet<'a>, QueryError> {
        let question = self.question_info(column)?;
        let rows = matching_indices(
            base.table,
            &base.rows,
            base.table.column_index(column),
            question.question_type,
            value,
            mode,
            &self.missing,
        );
        debug!(
            "Subset {column} {} '{value}': {} of {} respondents",
            match mode {
                MatchMode::Exact => "=",
                MatchMode::Contains => "contains",
            },
            rows.len(),
            base.len()
        );
        Ok(RespondentSet {
            table: base.table,
            rows,
        })
    }

    // -- aggregation --

    /// Answer distribution for `column` over `set` (every respondent when
    /// `None`), optionally cut to the `top_n` most frequent options.
    pub fn distribution(
        &self,
        column: &str,
        set: Option<&RespondentSet<'_>>,
        top_n: Option<usize>,
    ) -> Result<Distribution, QueryError> {
        let question = self.question_info(column)?;
        let all;
        let set = match set {
            Some(s) => s,
            None => {
                all = self.all_respondents();
                &all
            }
        };
        let dist = distribution::compute(
            question,
            set.len(),
            set.cells(set.table.column_index(column)),
            &self.missing,
            top_n,
        );
        debug!(
            "Distribution of {column}: {} options over {} valid responses",
            dist.options.len(),
            dist.valid_responses
        );
        Ok(dist)
    }

    pub fn summary_stats(&self) -> SummaryStats {
        summary::compute(&self.schema, &self.responses, &self.missing)
    }
}
