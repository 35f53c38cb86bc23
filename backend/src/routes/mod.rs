mod config;
mod docs;
mod health;
pub mod list;
pub mod uploads;

use std::time::Duration;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::extract::DefaultBodyLimit;
use tower_http::timeout::TimeoutLayer;

/// Largest JSON body accepted by the request/response routes
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

const JSON_ROUTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    let json_routes = ApiRouter::new()
        .api_route("/health", get(health::handler))
        .api_route("/upload-config", get(config::handler))
        .api_route("/sign-upload", post(uploads::sign_upload))
        .api_route("/list", get(list::list_objects))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(TimeoutLayer::new(JSON_ROUTE_TIMEOUT));

    // Streams of arbitrary duration: no timeout, body size enforced by the relay
    let upload_routes = ApiRouter::new().route(
        "/upload-proxy",
        axum::routing::post(uploads::upload_proxy),
    );

    ApiRouter::new()
        .merge(docs::handler())
        .merge(json_routes)
        .merge(upload_routes)
}
