use thiserror::Error;

use crate::types::TimeWindow;

/// Failure while reading from or writing to the draw history.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed row: {0}")]
    Malformed(String),
}

/// Conditions that turn a pattern report into its degraded form.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no draws recorded for window '{0}'")]
    EmptyWindow(TimeWindow),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown time window '{0}'")]
    UnknownWindow(String),

    #[error("unknown animal '{0}'")]
    UnknownAnimal(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog must list {expected} animals, found {found}")]
    WrongSize { expected: usize, found: usize },

    #[error("animal {0} listed more than once")]
    Duplicate(String),

    #[error("animal {animal} has number {found}, expected {expected}")]
    NumberMismatch { animal: String, expected: u8, found: u8 },
}
