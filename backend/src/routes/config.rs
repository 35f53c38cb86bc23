use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::types::AppConfig;

#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfigResponse {
    /// Largest body accepted by `/upload-proxy`
    max_upload_bytes: u64,
    /// Validity of URLs returned by `/sign-upload`, in seconds
    signed_url_expires_in: u64,
    /// Base URL uploaded objects are served from, if public
    public_base_url: Option<String>,
}

pub async fn handler(Extension(config): Extension<Arc<AppConfig>>) -> Json<UploadConfigResponse> {
    Json(UploadConfigResponse {
        max_upload_bytes: config.max_upload_bytes,
        signed_url_expires_in: config.presigned_url_expiry().as_secs(),
        public_base_url: config.public_base_url.clone(),
    })
}
