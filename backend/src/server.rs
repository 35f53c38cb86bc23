use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{
    http::{header, HeaderValue},
    Extension, Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    gallery::Gallery,
    middleware::{enforce_origin, OriginPolicy},
    object_store::ObjectStore,
    relay::UploadRelay,
    routes,
    signer::CredentialSigner,
    types::AppConfig,
};

/// Builds the fully layered application router
///
/// Every dependency is constructed here from the shared store client and
/// injected into handlers as an extension.
pub fn router(
    config: Arc<AppConfig>,
    store: Arc<dyn ObjectStore>,
    http_client: reqwest::Client,
) -> Router {
    let signer = CredentialSigner::new(Arc::clone(&store));
    let relay = Arc::new(UploadRelay::new(
        signer.clone(),
        http_client,
        config.max_upload_bytes,
    ));
    let gallery = Arc::new(Gallery::new(
        store,
        config.public_base_url.clone(),
        config.list_prefix.clone(),
    ));
    let origin_policy = Arc::new(OriginPolicy::from_origins(&config.allowed_origins));

    let mut openapi = OpenApi::default();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(config.environment.clone()))
        .layer(Extension(config))
        .layer(Extension(Arc::new(signer)))
        .layer(Extension(relay))
        .layer(Extension(gallery))
        .layer(origin_policy.cors_layer())
        // Blocks disallowed origins before any handler runs
        .layer(axum::middleware::from_fn_with_state(
            origin_policy,
            enforce_origin,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Starts the server with the given configuration and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to bind to the port
pub async fn start(
    config: Arc<AppConfig>,
    store: Arc<dyn ObjectStore>,
    http_client: reqwest::Client,
) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let router = router(config, store, http_client);

    let listener = TcpListener::bind(&addr).await?;
    info!("Upload gateway listening on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
