//! Cross-origin policy and response hardening headers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::AppState;

/// Hardened: only `allowed_origin`, GET/POST. Other origins get no
/// `Access-Control-Allow-Origin` header at all. Otherwise any origin.
pub fn cors_layer(restrict_origin: bool, allowed_origin: &str) -> CorsLayer {
    if !restrict_origin {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed = match HeaderValue::from_str(allowed_origin.trim()) {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::error!(
                "[CORS] Invalid allowed origin {:?}; cross-origin requests will be refused",
                allowed_origin
            );
            None
        }
    };
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            allowed.as_ref() == Some(origin)
        }))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::HeaderName::from_static("x-session-id")])
}

pub async fn security_headers(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    if !state.service.limits().security_headers {
        return response;
    }
    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        header::HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    response
}
