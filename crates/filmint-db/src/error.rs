//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing database could not be opened or created.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Update or delete target does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A transaction failed to begin, aborted, or failed to commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A mint references a collection that does not exist.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::TransactionFailed(err.to_string())
    }
}
