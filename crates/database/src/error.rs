//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

impl DatabaseError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
