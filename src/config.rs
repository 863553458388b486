use clap::ValueEnum;

use crate::data::filter::MissingPolicy;

/// How the shell renders query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Settings that shape how a survey is loaded and presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyConfig {
    /// Cell values (compared after trimming) that count as "no answer".
    pub null_markers: Vec<String>,
    /// Initial output format of the shell.
    pub output: OutputFormat,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            null_markers: vec!["NA".to_string()],
            output: OutputFormat::Text,
        }
    }
}

impl SurveyConfig {
    pub fn missing_policy(&self) -> MissingPolicy {
        MissingPolicy::new(self.null_markers.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_treats_na_as_missing() {
        let policy = SurveyConfig::default().missing_policy();
        assert!(policy.is_missing("NA"));
        assert!(policy.is_missing("  "));
        assert!(!policy.is_missing("N/A"));
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!(
            OutputFormat::from_str("JSON", true),
            Ok(OutputFormat::Json)
        );
        assert!(OutputFormat::from_str("yaml", true).is_err());
    }
}
