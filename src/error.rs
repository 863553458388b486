use thiserror::Error;

/// Errors raised by queries against a loaded survey.
///
/// Load failures are not represented here: they surface as [`anyhow::Error`]
/// from the loader and abort construction of a [`crate::query::Survey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("unknown question type '{0}' (expected SC, MC or TE)")]
    UnknownType(String),
}
