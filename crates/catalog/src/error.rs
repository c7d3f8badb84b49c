//! Error types for catalog operations.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while fetching or caching catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote endpoint answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or canonical reason.
        message: String,
    },

    /// Payload could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Product store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Local file operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cached file or bundled resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for `CatalogError`.
pub type Result<T> = std::result::Result<T, CatalogError>;
