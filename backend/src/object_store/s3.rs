//! S3 implementation of [`ObjectStore`]

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, primitives::DateTime as SmithyDateTime, Client};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ObjectPage, ObjectStore, ObjectSummary, PresignedUrl, StorageError, StorageResult};

/// Object store backed by the AWS S3 SDK
pub struct S3ObjectStore {
    s3_client: Arc<Client>,
    bucket_name: String,
    has_credentials: bool,
}

const NO_CREDENTIALS: &str = "object store credentials are not configured";

impl S3ObjectStore {
    /// Creates a new store client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket all keys live in
    #[must_use]
    pub const fn new(s3_client: Arc<Client>, bucket_name: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            has_credentials: true,
        }
    }

    /// Marks the client as unauthenticated so every call fails instead of
    /// going out unsigned
    #[must_use]
    pub const fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<PresignedUrl> {
        if !self.has_credentials {
            return Err(StorageError::Signing(NO_CREDENTIALS.to_string()));
        }

        let presigning_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageError::Signing(format!("Failed to create presigning config: {e}"))
        })?;

        // Presigning is local; the SDK only needs credentials and endpoint metadata
        let presigned = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::Signing(format!("{e:?}")))?;

        let expires_at: DateTime<Utc> = Utc::now() + expires_in;
        debug!(key, %expires_at, "presigned PUT url");

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            expires_at,
            expires_in,
        })
    }

    async fn list_objects(&self, prefix: &str, max_keys: i32) -> StorageResult<ObjectPage> {
        if !self.has_credentials {
            return Err(StorageError::Listing(NO_CREDENTIALS.to_string()));
        }

        let output = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .prefix(prefix)
            .max_keys(max_keys)
            .send()
            .await
            .map_err(|e| StorageError::Listing(format!("{e:?}")))?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                Some(ObjectSummary {
                    key: object.key()?.to_string(),
                    size: object.size().unwrap_or_default(),
                    last_modified: object.last_modified().and_then(to_chrono),
                })
            })
            .collect();

        Ok(ObjectPage {
            objects,
            is_truncated: output.is_truncated().unwrap_or_default(),
        })
    }
}

fn to_chrono(timestamp: &SmithyDateTime) -> Option<DateTime<Utc>> {
    SystemTime::try_from(*timestamp).ok().map(DateTime::<Utc>::from)
}
