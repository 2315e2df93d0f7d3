// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A concurrent write changed the row between read and compare-and-swap
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Duplicate job number: {0}")]
    DuplicateJobNumber(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for a status change that is not in the adjacency table
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            AppError::Domain(crate::domain::DomainError::InvalidStateTransition { .. })
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)
