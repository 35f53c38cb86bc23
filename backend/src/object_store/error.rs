//! Error types for object store operations

use thiserror::Error;

/// Result type for object store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to the object store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Presigning failed (missing or malformed credentials, bad expiry)
    #[error("Failed to sign request: {0}")]
    Signing(String),

    /// The listing call failed; no partial results are returned
    #[error("Failed to list objects: {0}")]
    Listing(String),
}
