//! Process-wide configuration, read once at startup

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_sdk_s3::config::{Credentials, RequestChecksumCalculation};

use super::Environment;

/// Upper bound for a single proxied upload (5 GiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Prefix listed when the caller does not send one
pub const DEFAULT_LIST_PREFIX: &str = "uploads/";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REGION: &str = "us-east-1";

/// Immutable application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment stage
    pub environment: Environment,
    /// Access key id for the object store
    pub access_key_id: Option<String>,
    /// Secret access key for the object store
    pub secret_access_key: Option<String>,
    /// Bucket all objects live in
    pub bucket: String,
    /// Store region
    pub region: String,
    /// Custom endpoint for S3-compatible stores
    pub endpoint_url: Option<String>,
    /// Use `endpoint/bucket/key` addressing instead of virtual hosts
    pub force_path_style: bool,
    /// Base URL objects are publicly served from
    pub public_base_url: Option<String>,
    /// Allowed browser origins; empty means any origin
    pub allowed_origins: Vec<String>,
    /// Listen port
    pub port: u16,
    /// Largest body accepted by the upload proxy
    pub max_upload_bytes: u64,
    /// Prefix listed by default
    pub list_prefix: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment
    #[must_use]
    pub fn from_env(environment: Environment) -> Self {
        let endpoint_url =
            non_empty_var("S3_ENDPOINT_URL").or_else(|| {
                environment.default_store_endpoint().map(ToString::to_string)
            });
        let force_path_style = non_empty_var("S3_FORCE_PATH_STYLE").map_or_else(
            || matches!(environment, Environment::Development { .. }),
            |val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"),
        );

        Self {
            access_key_id: non_empty_var("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("S3_SECRET_ACCESS_KEY"),
            bucket: non_empty_var("S3_BUCKET_NAME").unwrap_or_default(),
            region: non_empty_var("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url,
            force_path_style,
            public_base_url: non_empty_var("PUBLIC_BASE_URL"),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
            port: parse_var("PORT").unwrap_or(DEFAULT_PORT),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            list_prefix: env::var("LIST_PREFIX").unwrap_or_else(|_| DEFAULT_LIST_PREFIX.to_string()),
            environment,
        }
    }

    /// Settings that are missing but required for store calls to succeed
    #[must_use]
    pub fn missing_store_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.access_key_id.is_none() {
            missing.push("S3_ACCESS_KEY_ID");
        }
        if self.secret_access_key.is_none() {
            missing.push("S3_SECRET_ACCESS_KEY");
        }
        if self.bucket.is_empty() {
            missing.push("S3_BUCKET_NAME");
        }
        missing
    }

    /// Whether both halves of the static store credentials are set
    #[must_use]
    pub const fn has_store_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Validity of URLs handed out by `/sign-upload`
    #[must_use]
    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.environment.presigned_url_expiry_secs())
    }

    /// S3 client configuration
    ///
    /// Retries are disabled: a failed store call is terminal for the request.
    /// Only the `S3_*` credentials are used; the ambient AWS provider chain is
    /// never consulted.
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let timeout_config = TimeoutConfig::builder()
            .connect_timeout(Duration::from_secs(5))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config);

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&self.access_key_id, &self.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                "upload-gateway-env",
            ));
        } else {
            loader = loader.no_credentials();
        }

        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        builder.set_force_path_style(Some(self.force_path_style));
        // Checksums would be signed into presigned URLs and break uploads on
        // S3-compatible stores
        builder.set_request_checksum_calculation(Some(RequestChecksumCalculation::WhenRequired));
        builder.build()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    non_empty_var(name).and_then(|val| val.parse().ok())
}

/// Splits a comma-separated origin list; `*` anywhere means any origin
#[must_use]
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Vec::new();
    }
    origins
}
