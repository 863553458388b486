use std::collections::HashMap;

use serde::Serialize;

use crate::data::filter::{distinct_mc_tokens, MissingPolicy};
use crate::data::model::{Question, QuestionType};

/// Count and share of one observed option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionShare {
    pub value: String,
    pub count: usize,
    /// `count / valid_responses * 100`.
    pub percentage: f64,
}

/// Answer frequencies of one question within one respondent collection.
///
/// For multiple-choice questions a respondent counts once towards every
/// distinct option they selected, so percentages may add up to more than 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub column: String,
    pub question_text: String,
    pub question_type: QuestionType,
    /// Size of the collection the distribution was computed over.
    pub total_respondents: usize,
    /// Respondents with a non-missing answer; the percentage denominator.
    pub valid_responses: usize,
    /// Sum of all option counts before truncation.
    pub total_selections: usize,
    /// Descending by count, ties in first-encountered order.
    pub options: Vec<OptionShare>,
}

impl Distribution {
    pub fn get(&self, value: &str) -> Option<&OptionShare> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Share of the collection that answered at all, in percent.
    pub fn response_rate(&self) -> f64 {
        percentage(self.valid_responses, self.total_respondents)
    }
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Option counter that remembers the order options were first seen in.
#[derive(Default)]
struct Tally<'a> {
    counts: Vec<(&'a str, usize)>,
    slots: HashMap<&'a str, usize>,
}

impl<'a> Tally<'a> {
    fn add(&mut self, value: &'a str) {
        match self.slots.get(value) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.slots.insert(value, self.counts.len());
                self.counts.push((value, 1));
            }
        }
    }

    /// Counts sorted descending; the stable sort keeps first-seen order on ties.
    fn into_sorted(mut self) -> Vec<(&'a str, usize)> {
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
    }
}

/// Compute the distribution of `question` over the given raw cells.
///
/// `cells` yields one raw value per member of a collection of
/// `total_respondents`; it is empty when the question has no response column.
pub(crate) fn compute<'a, I>(
    question: &Question,
    total_respondents: usize,
    cells: I,
    missing: &MissingPolicy,
    top_n: Option<usize>,
) -> Distribution
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tally = Tally::default();
    let mut valid_responses = 0;

    for raw in cells {
        if missing.is_missing(raw) {
            continue;
        }
        match question.question_type {
            QuestionType::MultipleChoice => {
                let tokens = distinct_mc_tokens(raw, missing);
                if tokens.is_empty() {
                    continue;
                }
                valid_responses += 1;
                for tok in tokens {
                    tally.add(tok);
                }
            }
            QuestionType::SingleChoice | QuestionType::TextEntry => {
                valid_responses += 1;
                tally.add(raw.trim());
            }
        }
    }

    let mut sorted = tally.into_sorted();
    let total_selections: usize = sorted.iter().map(|(_, c)| c).sum();
    if let Some(n) = top_n {
        sorted.truncate(n);
    }

    Distribution {
        column: question.column.clone(),
        question_text: question.question_text.clone(),
        question_type: question.question_type,
        total_respondents,
        valid_responses,
        total_selections,
        options: sorted
            .into_iter()
            .map(|(value, count)| OptionShare {
                value: value.to_string(),
                count,
                percentage: percentage(count, valid_responses),
            })
            .collect(),
    }
}
