//! Error taxonomy for season scheduling.
//!
//! Configuration and construction errors abort before any solver call.
//! Solver statuses other than `Error` travel as data (see
//! [`SolveStatus`](crate::lp::SolveStatus)); only a failing engine and an
//! inconsistent solved assignment surface here.

use thiserror::Error;

use crate::validation::ConfigurationError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors raised while building, solving, or decoding a season model.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Malformed or inconsistent league configuration.
    #[error("invalid league configuration: {}", join_issues(.0))]
    Configuration(Vec<ConfigurationError>),

    /// An opponent was classified into two tiers, or into none.
    #[error("model construction failed at '{entity}': {message}")]
    ModelConstruction { entity: String, message: String },

    /// The optimization engine reported an error.
    #[error("solver '{solver}' failed: {message}")]
    Solver { solver: String, message: String },

    /// The solved assignment gives a team zero or several entries in a week.
    #[error("inconsistent assignment for team '{team}' in week {week}: {found} entries")]
    Consistency { team: String, week: u32, found: usize },

    /// Configuration file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    /// Configuration issues carried by this error, if any.
    pub fn configuration_issues(&self) -> &[ConfigurationError] {
        match self {
            Self::Configuration(issues) => issues,
            _ => &[],
        }
    }
}

fn join_issues(issues: &[ConfigurationError]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ConfigurationErrorKind;

    #[test]
    fn test_configuration_message_joins_issues() {
        let err = ScheduleError::Configuration(vec![
            ConfigurationError::new(ConfigurationErrorKind::DuplicateName, "Duplicate team: A"),
            ConfigurationError::new(ConfigurationErrorKind::UnknownTeam, "Unknown team: B"),
        ]);
        let text = err.to_string();
        assert!(text.contains("Duplicate team: A; Unknown team: B"));
        assert_eq!(err.configuration_issues().len(), 2);
    }

    #[test]
    fn test_consistency_message() {
        let err = ScheduleError::Consistency {
            team: "Bears".into(),
            week: 4,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "inconsistent assignment for team 'Bears' in week 4: 2 entries"
        );
        assert!(err.configuration_issues().is_empty());
    }
}
