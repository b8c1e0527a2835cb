//! Error types for filmint-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown {kind} status: {value}")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Malformed upload response: {0}")]
    MalformedResponse(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
