//! Origin allow-list enforcement

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header::ORIGIN, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::types::AppError;

/// Which browser origins may call the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Every origin is accepted
    Any,
    /// Only exact matches are accepted
    AllowList(Vec<String>),
}

impl OriginPolicy {
    /// Builds the policy from configured origins; an empty list accepts any origin
    #[must_use]
    pub fn from_origins(origins: &[String]) -> Self {
        if origins.is_empty() {
            Self::Any
        } else {
            Self::AllowList(origins.to_vec())
        }
    }

    /// Whether a request carrying `origin` may proceed
    ///
    /// Requests without an `Origin` header (server-to-server) are always allowed.
    #[must_use]
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (_, None) | (Self::Any, _) => true,
            (Self::AllowList(allowed), Some(origin)) => {
                allowed.iter().any(|candidate| candidate == origin)
            }
        }
    }

    /// CORS response layer mirroring this policy
    #[must_use]
    pub fn cors_layer(&self) -> CorsLayer {
        let policy = self.clone();
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                policy.allows(origin.to_str().ok())
            }))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(AllowHeaders::mirror_request())
            .max_age(Duration::from_secs(3600))
    }
}

/// Rejects requests whose `Origin` is not allow-listed before they reach a handler
pub async fn enforce_origin(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(ORIGIN).map(|value| value.to_str());

    let allowed = match origin {
        None => policy.allows(None),
        Some(Ok(origin)) => policy.allows(Some(origin)),
        // Non-ASCII origin can never match the allow-list
        Some(Err(_)) => matches!(*policy, OriginPolicy::Any),
    };

    if allowed {
        return next.run(request).await;
    }

    AppError::new(StatusCode::FORBIDDEN, "origin_not_allowed")
        .with_details(format!(
            "origin {:?} is not allowed",
            request.headers().get(ORIGIN)
        ))
        .into_response()
}
