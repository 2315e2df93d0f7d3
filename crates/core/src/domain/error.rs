// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    #[error("Invalid job number: {0}")]
    InvalidJobNumber(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
