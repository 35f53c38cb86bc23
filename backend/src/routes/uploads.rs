use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap,
    },
    Extension, Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    keys::{upload_key, validate_filename, DEFAULT_CLIP_NAME},
    relay::UploadRelay,
    signer::{effective_content_type, CredentialSigner},
    types::{AppConfig, AppError, ValidatedJson, ValidatedQuery},
};

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadRequest {
    /// Original filename; characters outside `[a-zA-Z0-9._-]` become `_` in the key
    #[serde(default)]
    #[validate(custom(function = "validate_filename"))]
    pub filename: String,
    /// MIME type the upload will be sent with (defaults to `application/octet-stream`)
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUploadResponse {
    /// Presigned URL to PUT the object to
    pub upload_url: String,
    /// Object key the upload will be stored under
    pub key: String,
    /// Validity of the URL in seconds
    pub expires_in: u64,
    /// ISO-8601 UTC timestamp when the URL expires
    pub expires_at: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadProxyQuery {
    /// Original filename; `clip.mp4` when absent
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadProxyResponse {
    pub ok: bool,
    pub key: String,
}

/// Issues a presigned PUT URL for a direct browser-to-store upload
///
/// The key is `uploads/<unix millis>-<random hex>-<sanitized filename>`.
///
/// # Errors
///
/// - 400 `invalid_input` - missing filename or unparsable content type
/// - 500 `failed_to_sign` - the store client could not sign the request
#[instrument(skip(signer, config, payload))]
pub async fn sign_upload(
    Extension(signer): Extension<Arc<CredentialSigner>>,
    Extension(config): Extension<Arc<AppConfig>>,
    ValidatedJson(payload): ValidatedJson<SignUploadRequest>,
) -> Result<Json<SignUploadResponse>, AppError> {
    let content_type = effective_content_type(payload.content_type.as_deref());
    if content_type.parse::<mime::Mime>().is_err() {
        return Err(AppError::bad_request(
            "invalid_input",
            format!("invalid content type: {content_type}"),
        ));
    }

    let key = upload_key(payload.filename.trim());
    let presigned_url = signer
        .sign(&key, Some(content_type), config.presigned_url_expiry())
        .await?;

    info!(key, "issued presigned upload url");

    Ok(Json(SignUploadResponse {
        upload_url: presigned_url.url,
        key,
        expires_in: presigned_url.expires_in.as_secs(),
        expires_at: presigned_url.expires_at.to_rfc3339(),
    }))
}

/// Streams the raw request body to the object store
///
/// # Errors
///
/// - 400 `invalid_input` - blank or over-long filename, bad `Content-Length` or content type
/// - 413 `payload_too_large` - body larger than the configured maximum
/// - 500 `failed_to_sign` - the store client could not sign the request
/// - 502 `upstream_put_failed` / `upstream_unavailable` - the store did not accept the write
#[instrument(skip(relay, headers, body))]
pub async fn upload_proxy(
    Extension(relay): Extension<Arc<UploadRelay>>,
    ValidatedQuery(query): ValidatedQuery<UploadProxyQuery>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<UploadProxyResponse>, AppError> {
    let filename = match query.filename.as_deref() {
        None => DEFAULT_CLIP_NAME,
        Some(name) => {
            validate_filename(name).map_err(|err| {
                AppError::bad_request(
                    "invalid_input",
                    err.message.map_or_else(|| err.code.into_owned(), Cow::into_owned),
                )
            })?;
            name.trim()
        }
    };

    let content_length = headers
        .get(CONTENT_LENGTH)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(|len| len.parse::<u64>().ok())
                .ok_or_else(|| AppError::bad_request("invalid_input", "invalid Content-Length"))
        })
        .transpose()?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| AppError::bad_request("invalid_input", "invalid Content-Type"))
        })
        .transpose()?;

    let key = upload_key(filename);
    let uploaded = relay
        .relay(body.into_data_stream(), content_length, content_type, &key)
        .await?;

    Ok(Json(UploadProxyResponse {
        ok: true,
        key: uploaded.key,
    }))
}
