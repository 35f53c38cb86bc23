//! Object store abstraction and its S3 implementation
mod error;
mod s3;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use error::{StorageError, StorageResult};
pub use s3::S3ObjectStore;

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for PUT operations
    pub url: String,
    /// ISO-8601 UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
    /// Validity window the URL was signed with
    pub expires_in: Duration,
}

/// Store-held metadata of a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,
    /// Size in bytes
    pub size: i64,
    /// Last modification time, if the store reported one
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of a listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Objects in store-native order
    pub objects: Vec<ObjectSummary>,
    /// Whether the store holds more objects than it returned
    pub is_truncated: bool,
}

/// Operations this service needs from an S3-compatible store
///
/// Constructed once at startup and shared by every handler.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Signs a single PUT of `key` with the given content type
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Signing` if the request cannot be signed
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl>;

    /// Lists up to `max_keys` objects under `prefix`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Listing` on any store-side failure
    async fn list_objects(&self, prefix: &str, max_keys: i32) -> StorageResult<ObjectPage>;
}
