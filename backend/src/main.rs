use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::Client as S3Client;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use upload_gateway::{
    object_store::S3ObjectStore,
    server,
    types::{AppConfig, Environment},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(environment.tracing_level().as_str()));

    // JSON lines for deployed stages, human-readable output locally
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = Arc::new(AppConfig::from_env(environment));

    let missing = config.missing_store_settings();
    if !missing.is_empty() {
        warn!(
            "Missing object store settings: {}. Requests touching the store will fail until they are set.",
            missing.join(", ")
        );
    }

    let s3_client = Arc::new(S3Client::from_conf(config.s3_client_config().await));
    let mut store = S3ObjectStore::new(s3_client, config.bucket.clone());
    if !config.has_store_credentials() {
        store = store.without_credentials();
    }
    let store = Arc::new(store);

    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    info!(
        bucket = %config.bucket,
        endpoint = ?config.endpoint_url,
        max_upload_bytes = config.max_upload_bytes,
        "object store configured"
    );

    server::start(config, store, http_client).await
}
