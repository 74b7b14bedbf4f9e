//! Domain error types.

use crate::models::ContentIssue;
use thiserror::Error;

/// Failure reported by a persistence backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors returned by the configuration and content services.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Content validation failed: {}", format_issues(.0))]
    ContentValidation(Vec<ContentIssue>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid rollback: {0}")]
    InvalidRollback(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            other => DomainError::Storage(other),
        }
    }
}

fn format_issues(issues: &[ContentIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type StoreResult<T> = Result<T, StoreError>;
