//! Error types for the auxiliary data sources.

use thiserror::Error;

/// Errors raised while reading the merchant directory or payment ledger.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Query or connection failure.
    #[error("source database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Writing a snapshot to the primary store failed.
    #[error("snapshot store error: {0}")]
    Store(#[from] database::DatabaseError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
