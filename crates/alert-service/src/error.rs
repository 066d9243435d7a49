//! Service error types.

use database::{DatabaseError, ValidationError};
use thiserror::Error;

/// Errors returned by the alert and call log services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed or incomplete.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The store failed.
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Database(other),
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
