//! Error types for ingestion, configuration, and ledger operations.
//!
//! Constraint outcomes are not errors: the validator reports them as
//! [`ConstraintViolation`](crate::validation::ConstraintViolation) values.
//! `ScheduleError` covers malformed input at the crate boundary and
//! lookups of classes that do not exist.

use thiserror::Error;

/// Crate result alias.
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid day of week: {0}")]
    InvalidDay(String),

    #[error("Invalid record field '{field}': {reason}")]
    InvalidRecord { field: &'static str, reason: String },

    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    pub(crate) fn invalid_record(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            field,
            reason: reason.into(),
        }
    }
}
