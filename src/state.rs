use crate::config::OutputFormat;
use crate::data::filter::MatchMode;
use crate::error::QueryError;
use crate::query::{RespondentSet, Survey};

// ---------------------------------------------------------------------------
// Shell session state
// ---------------------------------------------------------------------------

/// A subset the user narrowed the session down to.
pub struct ActiveSubset<'a> {
    /// Human-readable description of the filters applied so far.
    pub label: String,
    pub respondents: RespondentSet<'a>,
}

/// Everything the shell remembers between commands, independent of rendering.
pub struct ShellState<'a> {
    pub survey: &'a Survey,

    /// Every respondent (cached).
    all: RespondentSet<'a>,

    /// Current subset (None until the user runs `subset`).
    pub subset: Option<ActiveSubset<'a>>,

    /// How results are printed.
    pub format: OutputFormat,
}

impl<'a> ShellState<'a> {
    pub fn new(survey: &'a Survey, format: OutputFormat) -> Self {
        Self {
            survey,
            all: survey.all_respondents(),
            subset: None,
            format,
        }
    }

    /// Respondents that queries currently run against.
    pub fn current(&self) -> &RespondentSet<'a> {
        self.subset
            .as_ref()
            .map_or(&self.all, |s| &s.respondents)
    }

    pub fn current_label(&self) -> &str {
        self.subset
            .as_ref()
            .map_or("Full dataset", |s| s.label.as_str())
    }

    /// Narrow the current collection; returns the new size.
    pub fn apply_subset(
        &mut self,
        column: &str,
        value: &str,
        mode: MatchMode,
    ) -> Result<usize, QueryError> {
        let respondents = self
            .survey
            .refine_subset(self.current(), column, value, mode)?;
        let op = match mode {
            MatchMode::Exact => "=",
            MatchMode::Contains => "~",
        };
        let filter = format!("{column}{op}'{value}'");
        let label = match &self.subset {
            Some(prev) => format!("{} & {filter}", prev.label),
            None => filter,
        };
        let n = respondents.len();
        self.subset = Some(ActiveSubset { label, respondents });
        Ok(n)
    }

    /// Go back to the full dataset.
    pub fn reset(&mut self) {
        self.subset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::MissingPolicy;
    use crate::data::model::{Question, QuestionType, Respondent, ResponseTable, SurveySchema};

    fn survey() -> Survey {
        let schema = SurveySchema::from_questions(vec![
            Question {
                column: "Role".into(),
                question_text: "What do you do?".into(),
                question_type: QuestionType::SingleChoice,
            },
            Question {
                column: "Lang".into(),
                question_text: "Languages?".into(),
                question_type: QuestionType::MultipleChoice,
            },
        ])
        .unwrap();
        let rows = [["dev", "Rust;Go"], ["dev", "Go"], ["student", "Rust"]];
        let responses = ResponseTable::from_rows(
            vec!["Role".into(), "Lang".into()],
            rows.iter()
                .map(|r| Respondent {
                    cells: r.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        )
        .unwrap();
        Survey::new(schema, responses, MissingPolicy::default())
    }

    #[test]
    fn subsets_chain_and_reset() {
        let survey = survey();
        let mut state = ShellState::new(&survey, OutputFormat::Text);
        assert_eq!(state.current().len(), 3);
        assert_eq!(state.current_label(), "Full dataset");

        assert_eq!(state.apply_subset("Role", "dev", MatchMode::Exact), Ok(2));
        assert_eq!(state.apply_subset("Lang", "Rust", MatchMode::Exact), Ok(1));
        assert_eq!(state.current_label(), "Role='dev' & Lang='Rust'");
        assert_eq!(state.current().indices(), &[0]);

        state.reset();
        assert_eq!(state.current().len(), 3);
    }

    #[test]
    fn failed_subset_keeps_previous_collection() {
        let survey = survey();
        let mut state = ShellState::new(&survey, OutputFormat::Text);
        state.apply_subset("Role", "dev", MatchMode::Exact).unwrap();
        assert!(state.apply_subset("Salary", "1", MatchMode::Exact).is_err());
        assert_eq!(state.current().len(), 2);
    }
}
