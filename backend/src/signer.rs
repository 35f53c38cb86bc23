//! Credential signing for single-object uploads

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::object_store::{ObjectStore, PresignedUrl, StorageError, StorageResult};

/// Content type used when the caller does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Issues time-limited PUT capabilities for single keys
#[derive(Clone)]
pub struct CredentialSigner {
    store: Arc<dyn ObjectStore>,
}

impl CredentialSigner {
    /// Creates a signer on top of the shared store client
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Signs a PUT of `key`
    ///
    /// An absent or blank `content_type` is signed as `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidInput` for an empty key and
    /// `StorageError::Signing` when the store client cannot sign.
    #[instrument(skip(self))]
    pub async fn sign(
        &self,
        key: &str,
        content_type: Option<&str>,
        ttl: Duration,
    ) -> StorageResult<PresignedUrl> {
        if key.is_empty() {
            return Err(StorageError::InvalidInput("key must not be empty".to_string()));
        }

        self.store
            .presign_put(key, effective_content_type(content_type), ttl)
            .await
    }
}

/// Declared content type, or the generic binary type when blank
#[must_use]
pub fn effective_content_type(content_type: Option<&str>) -> &str {
    content_type
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
