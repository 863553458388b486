use super::model::{QuestionType, ResponseTable};

/// Separator between the selections of a multiple-choice cell.
pub const MC_DELIMITER: char = ';';

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Decides which raw cells count as "no answer".
///
/// A cell is missing when it is empty, whitespace-only, or equal (after
/// trimming) to one of the designated null markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPolicy {
    null_markers: Vec<String>,
}

impl Default for MissingPolicy {
    fn default() -> Self {
        Self::new(["NA"])
    }
}

impl MissingPolicy {
    pub fn new<I, S>(null_markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            null_markers: null_markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn null_markers(&self) -> &[String] {
        &self.null_markers
    }

    pub fn is_missing(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.is_empty() || self.null_markers.iter().any(|m| m == trimmed)
    }
}

// ---------------------------------------------------------------------------
// Multiple-choice tokens
// ---------------------------------------------------------------------------

/// Split a multiple-choice cell into trimmed selections, dropping empty ones
/// and any that are themselves a null marker.
pub fn mc_tokens<'a>(raw: &'a str, missing: &'a MissingPolicy) -> impl Iterator<Item = &'a str> {
    raw.split(MC_DELIMITER)
        .map(str::trim)
        .filter(move |t| !missing.is_missing(t))
}

/// Like [`mc_tokens`] but each selection appears once, in first-seen order.
pub fn distinct_mc_tokens<'a>(raw: &'a str, missing: &'a MissingPolicy) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for tok in mc_tokens(raw, missing) {
        if !out.contains(&tok) {
            out.push(tok);
        }
    }
    out
}

/// Whether a cell holds an actual answer.
///
/// A multiple-choice cell needs at least one non-missing selection.
pub fn has_answer(raw: &str, question_type: QuestionType, missing: &MissingPolicy) -> bool {
    match question_type {
        QuestionType::MultipleChoice => mc_tokens(raw, missing).next().is_some(),
        QuestionType::SingleChoice | QuestionType::TextEntry => !missing.is_missing(raw),
    }
}

// ---------------------------------------------------------------------------
// Row predicates
// ---------------------------------------------------------------------------

/// How a subset value is compared against a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Equality for single values, membership for multiple-choice selections.
    #[default]
    Exact,
    /// Case-insensitive substring test (per selection for multiple choice).
    Contains,
}

/// Whether one raw cell satisfies the subset predicate.
///
/// Missing cells never match.
pub fn cell_matches(
    raw: &str,
    question_type: QuestionType,
    value: &str,
    mode: MatchMode,
    missing: &MissingPolicy,
) -> bool {
    if missing.is_missing(raw) {
        return false;
    }
    let value = value.trim();
    match (question_type, mode) {
        (QuestionType::MultipleChoice, MatchMode::Exact) => {
            mc_tokens(raw, missing).any(|tok| tok == value)
        }
        (QuestionType::MultipleChoice, MatchMode::Contains) => {
            let needle = value.to_lowercase();
            mc_tokens(raw, missing).any(|tok| tok.to_lowercase().contains(&needle))
        }
        (_, MatchMode::Exact) => raw.trim() == value,
        (_, MatchMode::Contains) => raw.trim().to_lowercase().contains(&value.to_lowercase()),
    }
}

/// Return the subset of `candidates` whose cell in `column_idx` matches.
///
/// `column_idx` is `None` when the question has no column in the response
/// table; nothing matches then. Order of `candidates` is preserved.
pub fn matching_indices(
    table: &ResponseTable,
    candidates: &[usize],
    column_idx: Option<usize>,
    question_type: QuestionType,
    value: &str,
    mode: MatchMode,
    missing: &MissingPolicy,
) -> Vec<usize> {
    let Some(col) = column_idx else {
        return Vec::new();
    };
    candidates
        .iter()
        .copied()
        .filter(|&row| cell_matches(table.cell(row, col), question_type, value, mode, missing))
        .collect()
}
