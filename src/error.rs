use std::path::PathBuf;

use thiserror::Error;

/// Errors the scoring tool reports to the user. Anything else (tokenizer,
/// tensor, download failures) travels as `anyhow::Error` and surfaces as an
/// unexpected error at the boundary.
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("column '{column}' not found; available columns: {}", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
