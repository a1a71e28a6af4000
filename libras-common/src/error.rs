//! Common error types for the Libras backend

use thiserror::Error;

/// Common result type for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across backend components
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External provider call failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model output contained no usable structure
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
