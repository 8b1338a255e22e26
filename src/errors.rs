//! Error types for muisti.

use thiserror::Error;

/// Main error type for muisti operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vector store error.
    #[error("Store error: {0}")]
    Store(#[from] crate::store::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Provider returned a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider response was missing expected content.
    #[error("Provider error: {0}")]
    Provider(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt template error.
    #[error("Template error: {0}")]
    Template(String),

    /// Empty or whitespace-only input.
    #[error("Input cannot be empty")]
    EmptyInput,

    /// Input exceeded the maximum allowed length.
    #[error("Input too long: {actual_length} characters (maximum {max_length})")]
    InputTooLong {
        max_length: usize,
        actual_length: usize,
    },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record not found.
    #[error("No record found with id: {0}")]
    NotFound(String),
}
