//! Error types for dataset loading and aggregation.

use thiserror::Error;

/// Errors raised by the loader and the aggregation pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required column is missing, or a value has the wrong type or domain.
    #[error(
        "schema error{}: {message}",
        .row.map(|r| format!(" at row {}", r)).unwrap_or_default()
    )]
    Schema {
        message: String,
        /// 1-based data row the problem was found on, if any.
        row: Option<usize>,
    },

    /// The dataset has no records, so every aggregation would be vacuous.
    #[error("empty input: the dataset contains no passenger records")]
    EmptyInput,

    /// A rate was requested for a group with no members.
    #[error("division undefined: group {group} has no passengers")]
    DivisionUndefined { group: String },
}

impl AnalysisError {
    /// Schema error not tied to a specific row (e.g. a missing column).
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            row: None,
        }
    }

    /// Schema error found while reading data row `row`.
    pub fn schema_at(row: usize, message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            row: Some(row),
        }
    }
}

/// Result alias for the pipeline.
pub type Result<T> = std::result::Result<T, AnalysisError>;
