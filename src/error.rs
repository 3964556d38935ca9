//! Error types for Daily Insight

use crate::types::VariableType;
use thiserror::Error;

/// Errors that can occur during normalization and analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No samples to normalize")]
    EmptyInput,

    #[error("Paired series differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Insufficient data: {actual} paired samples, at least {required} required")]
    InsufficientData { required: usize, actual: usize },

    #[error("No statistical procedure for {0:?} x {1:?}")]
    UnsupportedTypePair(VariableType, VariableType),

    #[error("Series has zero variance: {0}")]
    ZeroVariance(String),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Invalid value {value} for variable '{variable}'")]
    InvalidValue { variable: String, value: f64 },

    #[error("Cell ({row}, {col}) outside {rows}x{cols} table")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Fixed, non-technical message for the presentation layer
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput
            | AnalysisError::InsufficientData { .. }
            | AnalysisError::ZeroVariance(_) => "not enough data yet",
            AnalysisError::LengthMismatch { .. } | AnalysisError::UnsupportedTypePair(..) => {
                "select two comparable variables"
            }
            AnalysisError::DateParseError(_)
            | AnalysisError::InvalidValue { .. }
            | AnalysisError::JsonError(_) => "the entry could not be read",
            AnalysisError::CellOutOfRange { .. } => "select a cell inside the chart",
            AnalysisError::ConfigError(_) => "the analysis settings are invalid",
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_fixed() {
        assert_eq!(
            AnalysisError::InsufficientData {
                required: 3,
                actual: 2
            }
            .user_message(),
            "not enough data yet"
        );
        assert_eq!(
            AnalysisError::UnsupportedTypePair(VariableType::Array, VariableType::Boolean)
                .user_message(),
            "select two comparable variables"
        );
        assert_eq!(
            AnalysisError::ZeroVariance("mood".to_string()).user_message(),
            "not enough data yet"
        );
    }
}
