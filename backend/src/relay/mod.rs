//! Streaming upload relay
//!
//! The inbound body is piped into the outbound PUT as a stream: the HTTP client
//! pulls the next chunk only once the previous one is written, so memory use is
//! bounded by the chunks in flight, never by the upload size.
mod error;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{info, instrument, warn};

pub use error::{RelayError, RelayResult};

use crate::{
    object_store::StorageError,
    signer::{effective_content_type, CredentialSigner},
};

/// Validity of the URL the relay signs for its own PUT
pub const RELAY_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Result of a relayed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedUpload {
    /// Key the object was written to
    pub key: String,
    /// Bytes forwarded to the store
    pub bytes: u64,
}

/// Forwards inbound upload streams to the object store
pub struct UploadRelay {
    signer: CredentialSigner,
    http_client: reqwest::Client,
    max_upload_bytes: u64,
}

#[derive(Default)]
struct BodyProgress {
    bytes: AtomicU64,
    limit_exceeded: AtomicBool,
    inbound_error: OnceLock<String>,
}

impl UploadRelay {
    /// Creates a relay
    ///
    /// # Arguments
    ///
    /// * `signer` - Signer used for the outbound PUT
    /// * `http_client` - Client the PUT is sent with
    /// * `max_upload_bytes` - Largest body forwarded
    #[must_use]
    pub const fn new(
        signer: CredentialSigner,
        http_client: reqwest::Client,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            signer,
            http_client,
            max_upload_bytes,
        }
    }

    /// Streams `body` to `key` in the object store
    ///
    /// Exactly one PUT is attempted once the request passes the size and
    /// content-type checks and signing succeeds. Dropping the returned future
    /// (client disconnect) aborts the PUT.
    ///
    /// # Errors
    ///
    /// - `RelayError::PayloadTooLarge` - declared or streamed size over the maximum
    /// - `RelayError::Storage` - invalid content type, empty key or signing failure
    /// - `RelayError::UpstreamPutFailed` - store answered with a non-2xx status
    /// - `RelayError::UpstreamUnavailable` - store could not be reached
    /// - `RelayError::UploadAborted` - inbound body failed mid-stream
    #[instrument(skip(self, body))]
    pub async fn relay<S, E>(
        &self,
        body: S,
        content_length: Option<u64>,
        content_type: Option<&str>,
        key: &str,
    ) -> RelayResult<RelayedUpload>
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        if content_length.is_some_and(|len| len > self.max_upload_bytes) {
            return Err(RelayError::PayloadTooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let content_type = effective_content_type(content_type);
        if content_type.parse::<mime::Mime>().is_err() {
            return Err(StorageError::InvalidInput(format!(
                "invalid content type: {content_type}"
            ))
            .into());
        }

        let presigned = self
            .signer
            .sign(key, Some(content_type), RELAY_URL_TTL)
            .await?;

        let progress = Arc::new(BodyProgress::default());
        let outbound = limit_body(body, self.max_upload_bytes, progress.clone());

        let mut request = self
            .http_client
            .put(&presigned.url)
            .header(CONTENT_TYPE, content_type)
            .body(reqwest::Body::wrap_stream(outbound));
        if let Some(len) = content_length {
            request = request.header(CONTENT_LENGTH, len);
        }

        let result = request.send().await;

        // The limit check wins over whatever the store made of the cut-off body
        if progress.limit_exceeded.load(Ordering::Acquire) {
            warn!(key, limit = self.max_upload_bytes, "upload exceeded limit mid-stream");
            return Err(RelayError::PayloadTooLarge {
                limit: self.max_upload_bytes,
            });
        }

        if let Some(reason) = progress.inbound_error.get() {
            warn!(key, reason, "inbound body failed mid-stream");
            return Err(RelayError::UploadAborted(reason.clone()));
        }

        // Logged in full here; the caller only sees the error without the signed URL
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(key, error = ?err, "object store PUT failed");
                return Err(RelayError::UpstreamUnavailable(err.without_url().to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(key, error = %err.without_url(), "failed to read object store error body");
                    String::new()
                }
            };
            warn!(key, status = status.as_u16(), "object store rejected upload");
            return Err(RelayError::UpstreamPutFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = progress.bytes.load(Ordering::Acquire);
        info!(key, bytes, "relayed upload to object store");

        Ok(RelayedUpload {
            key: key.to_string(),
            bytes,
        })
    }
}

/// Counts forwarded bytes and fails the stream once `limit` is crossed
fn limit_body<S, E>(
    body: S,
    limit: u64,
    progress: Arc<BodyProgress>,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    body.map(move |chunk| match chunk {
        Ok(bytes) => {
            let len = bytes.len() as u64;
            let total = progress.bytes.fetch_add(len, Ordering::AcqRel) + len;
            if total > limit {
                progress.limit_exceeded.store(true, Ordering::Release);
                Err(std::io::Error::other(format!(
                    "upload exceeds the maximum of {limit} bytes"
                )))
            } else {
                Ok(bytes)
            }
        }
        Err(err) => {
            progress.inbound_error.set(err.to_string()).ok();
            Err(std::io::Error::other(err))
        }
    })
}
