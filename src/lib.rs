//! Explore a tabular survey dataset: list and search questions, narrow the
//! respondents down to subsets, and compute answer distributions for
//! single- and multiple-choice questions.

pub mod config;
pub mod data;
pub mod error;
pub mod query;
pub mod shell;
pub mod state;

pub use config::{OutputFormat, SurveyConfig};
pub use data::filter::MatchMode;
pub use data::model::{Question, QuestionType};
pub use error::QueryError;
pub use query::{Distribution, RespondentSet, Survey};
