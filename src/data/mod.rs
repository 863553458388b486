/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  schema.csv / .json        responses.csv / .json / .parquet
///        │                              │
///        ▼                              ▼
///   ┌──────────┐                  ┌──────────┐
///   │  loader   │                  │  loader   │
///   └──────────┘                  └──────────┘
///        │                              │
///        ▼                              ▼
///   ┌──────────────┐             ┌───────────────┐
///   │ SurveySchema  │             │ ResponseTable  │  Vec<Respondent>, column index
///   └──────────────┘             └───────────────┘
///                     │
///                     ▼
///               ┌──────────┐
///               │  filter   │  missing values, MC tokens, match predicates → row indices
///               └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
