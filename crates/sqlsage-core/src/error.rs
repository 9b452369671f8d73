//! Error types for SQLSage

use thiserror::Error;

/// Core error type for SQLSage operations
#[derive(Error, Debug)]
pub enum SqlsageError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for SQLSage operations
pub type Result<T> = std::result::Result<T, SqlsageError>;
