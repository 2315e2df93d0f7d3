//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use fleetsure_core::domain::DomainError;
use fleetsure_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const INVALID_TRANSITION: i32 = 4004;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let message = err.to_string();
    match err {
        AppError::Domain(DomainError::InvalidStateTransition { from, to }) => {
            ErrorObjectOwned::owned(
                code::INVALID_TRANSITION,
                message,
                Some(serde_json::json!({ "from": from, "to": to })),
            )
        }
        AppError::Domain(_) | AppError::Validation(_) | AppError::Serialization(_) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, message, None::<()>)
        }
        AppError::NotFound(_) => ErrorObjectOwned::owned(code::NOT_FOUND, message, None::<()>),
        AppError::Conflict(_) => ErrorObjectOwned::owned(code::CONFLICT, message, None::<()>),
        AppError::Database(_) => ErrorObjectOwned::owned(code::DB_ERROR, message, None::<()>),
        // Exhausted job-number retries are a server-side capacity problem
        AppError::DuplicateJobNumber(_) | AppError::Config(_) | AppError::Internal(_) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, message, None::<()>)
        }
    }
}
