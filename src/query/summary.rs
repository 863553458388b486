use std::collections::BTreeMap;

use serde::Serialize;

use super::distribution::percentage;
use crate::data::filter::{has_answer, MissingPolicy};
use crate::data::model::{QuestionType, ResponseTable, SurveySchema};

/// Survey-wide counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_respondents: usize,
    pub total_questions: usize,
    /// Every type is present, zero when the schema has none of it.
    pub questions_by_type: BTreeMap<QuestionType, usize>,
    /// Mean over all questions of the share of respondents who answered.
    pub average_response_rate: f64,
    /// Same mean restricted to each type; types without questions are absent.
    pub response_rate_by_type: BTreeMap<QuestionType, f64>,
    /// Missing cells across all question columns.
    pub missing_cells: usize,
    /// Cell values read as "no answer".
    pub null_markers: Vec<String>,
}

pub(crate) fn compute(
    schema: &SurveySchema,
    responses: &ResponseTable,
    missing: &MissingPolicy,
) -> SummaryStats {
    let total_respondents = responses.len();
    let questions_by_type = QuestionType::ALL
        .iter()
        .map(|&t| (t, schema.count_of(t)))
        .collect();

    let mut missing_cells = 0;
    let mut rates: Vec<(QuestionType, f64)> = Vec::with_capacity(schema.len());

    for q in schema.questions() {
        // A question with no response column is entirely unanswered.
        let answered = match responses.column_index(&q.column) {
            Some(col) => (0..total_respondents)
                .filter(|&row| has_answer(responses.cell(row, col), q.question_type, missing))
                .count(),
            None => 0,
        };
        missing_cells += total_respondents - answered;
        rates.push((q.question_type, percentage(answered, total_respondents)));
    }

    let average_response_rate = mean(rates.iter().map(|(_, r)| *r));
    let response_rate_by_type = QuestionType::ALL
        .iter()
        .filter(|&&t| schema.count_of(t) > 0)
        .map(|&t| {
            let rate = mean(rates.iter().filter(|(qt, _)| *qt == t).map(|(_, r)| *r));
            (t, rate)
        })
        .collect();

    SummaryStats {
        total_respondents,
        total_questions: schema.len(),
        questions_by_type,
        average_response_rate,
        response_rate_by_type,
        missing_cells,
        null_markers: missing.null_markers().to_vec(),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
