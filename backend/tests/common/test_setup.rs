use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use upload_gateway::{
    server,
    types::{AppConfig, Environment},
};

use super::FakeStore;

/// Initialise tracing once per test binary
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Configuration used by the router tests
pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development {
            presign_expiry_override: None,
        },
        access_key_id: Some("test".to_string()),
        secret_access_key: Some("test".to_string()),
        bucket: "test-bucket".to_string(),
        region: "us-east-1".to_string(),
        endpoint_url: None,
        force_path_style: true,
        public_base_url: None,
        allowed_origins: Vec::new(),
        port: 0,
        max_upload_bytes: 1024 * 1024,
        list_prefix: "uploads/".to_string(),
    }
}

/// Router wired to a [`FakeStore`]
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<FakeStore>,
}

impl TestSetup {
    pub fn new(store: FakeStore) -> Self {
        Self::with_config(store, test_config())
    }

    pub fn with_config(store: FakeStore, config: AppConfig) -> Self {
        setup_test_env();

        let store = Arc::new(store);
        let router = server::router(Arc::new(config), store.clone(), reqwest::Client::new());

        Self { router, store }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send_post_request(&self, route: &str, payload: serde_json::Value) -> Response<Body> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        self.send(request).await
    }

    pub async fn send_get_request(&self, route: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
