//! Error types for the upload relay

use thiserror::Error;

use crate::object_store::StorageError;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that end a relayed upload
///
/// None of these are retried: the inbound stream may already be partially consumed.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Signing failed or the input was rejected before signing
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Body exceeds the configured maximum
    #[error("Upload exceeds the maximum of {limit} bytes")]
    PayloadTooLarge {
        /// Configured maximum in bytes
        limit: u64,
    },

    /// The store answered the PUT with a non-success status
    #[error("Object store rejected the upload with status {status}: {body}")]
    UpstreamPutFailed {
        /// Upstream HTTP status
        status: u16,
        /// Upstream response body
        body: String,
    },

    /// The PUT could not be delivered to the store
    #[error("Object store unreachable: {0}")]
    UpstreamUnavailable(String),

    /// The inbound body failed mid-stream (client disconnect, read error)
    #[error("Upload aborted by client: {0}")]
    UploadAborted(String),
}
