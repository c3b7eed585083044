//! CORS configuration and origin enforcement.
//!
//! Two layers work together: `cors_layer` handles the browser handshake
//! (preflight and response headers), and `enforce_origin` rejects requests
//! whose `Origin` header is present but not on the allow-list, so a bad
//! origin gets an explicit 403 envelope instead of a silently header-less
//! response.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use bramble_core::Envelope;

use crate::config::CorsConfig;
use crate::state::AppState;

/// Build the CORS layer from the configured allow-list.
#[must_use]
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let config = config.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().is_ok_and(|o| config.is_allowed(o))
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Reject requests from disallowed origins with a 403 envelope.
///
/// Requests without an `Origin` header (curl, server-to-server, health
/// probes) pass through untouched.
pub async fn enforce_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .is_ok_and(|o| state.config().cors.is_allowed(o));
        if !allowed {
            tracing::warn!(origin = ?origin, "rejected request from disallowed origin");
            let body = Envelope::<()>::err("Origin not allowed".to_owned());
            return (StatusCode::FORBIDDEN, Json(body)).into_response();
        }
    }
    next.run(request).await
}
