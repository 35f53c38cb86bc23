//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{object_store::StorageError, relay::RelayError};

/// Error envelope returned to callers
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Machine-readable error code
    pub error: &'static str,
    /// Optional diagnostic string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Status code returned by the object store, when it rejected a write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(status: StatusCode, code: &'static str) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: code,
                details: None,
                upstream_status: None,
            },
        }
    }

    /// Attach a diagnostic string
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.inner.details = Some(details.into());
        self
    }

    /// 400 with the given validation code
    #[must_use]
    pub fn bad_request(code: &'static str, details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code).with_details(details)
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = self.inner.details.as_deref().unwrap_or_default();
        match self.status.as_u16() {
            400..=499 => tracing::warn!("Client error: {} - {details}", self.inner.error),
            500..=599 => tracing::error!("Server error: {} - {details}", self.inner.error),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert storage errors to application errors
impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let details = err.to_string();
        match err {
            StorageError::InvalidInput(_) => Self::bad_request("invalid_input", details),
            StorageError::Signing(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "failed_to_sign").with_details(details)
            }
            StorageError::Listing(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "failed_to_list").with_details(details)
            }
        }
    }
}

/// Convert relay errors to application errors
impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        let details = err.to_string();
        match err {
            RelayError::Storage(storage_err) => storage_err.into(),
            RelayError::PayloadTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large").with_details(details)
            }
            RelayError::UpstreamPutFailed { status, .. } => {
                let mut app_err =
                    Self::new(StatusCode::BAD_GATEWAY, "upstream_put_failed").with_details(details);
                app_err.inner.upstream_status = Some(status);
                app_err
            }
            RelayError::UpstreamUnavailable(_) => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_unavailable").with_details(details)
            }
            RelayError::UploadAborted(_) => Self::bad_request("upload_aborted", details),
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
