//! Origin allow-listing.
//!
//! A request carrying an `Origin` header that is not on the allow-list is
//! rejected with `403` before anything inside this middleware runs. Allowed
//! origins are echoed back with the credentialed CORS headers. Preflight
//! `OPTIONS` requests are answered here with `204` and never reach the
//! handler.
//!
//! A request without an `Origin` header is rejected the same way, unless
//! `CorsConfig::allow_missing_origin` is set. Then it passes through
//! untouched.

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};

use classconnect_core::AppError;

use super::chain::Middleware;
use crate::router::route_label;
use crate::state::AppState;

const ALLOWED_HEADERS: &str = "Content-Type, Authorization";
const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE";

pub async fn cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(origin) = req.headers().get(header::ORIGIN).cloned() else {
        if state.cors_config.allow_missing_origin {
            return next.run(req).await;
        }
        tracing::warn!(path = route_label(req.uri().path()), "Request without origin rejected");
        return AppError::forbidden("Not allowed by CORS").into_response();
    };

    let allowed = origin
        .to_str()
        .map(|o| state.cors_config.is_allowed(o))
        .unwrap_or(false);

    if !allowed {
        tracing::warn!(origin = ?origin, path = route_label(req.uri().path()), "Origin not allowed");
        return AppError::forbidden("Not allowed by CORS").into_response();
    }

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("origin"));

    response
}

pub fn cors_guard(state: &AppState) -> Middleware {
    Middleware::from_layer("cors", from_fn_with_state(state.clone(), cors))
}
