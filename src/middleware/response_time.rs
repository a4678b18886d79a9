//! Request timing.
//!
//! Every request that reaches this point gets a request id, one log line on
//! the way in and one on the way out, HTTP metrics, and two response
//! headers: `X-Request-Id` and `X-Response-Time`.
//!
//! Logs and metrics carry the route template from
//! [`route_label`](crate::router::route_label), never the raw path.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tracing::{error, info, warn};

use super::chain::Middleware;
use crate::metrics::track_http_request;
use crate::router::route_label;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

pub async fn response_time(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = route_label(req.uri().path());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let mut response = next.run(req).await;
    let latency = start.elapsed();
    let status = response.status();

    match status.as_u16() {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            "Request completed"
        ),
    }

    track_http_request(method.as_str(), path, status.as_u16(), latency);

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{:.3}ms", latency.as_secs_f64() * 1000.0)) {
        headers.insert(RESPONSE_TIME_HEADER, value);
    }

    response
}

pub fn response_timer() -> Middleware {
    Middleware::from_layer("response_time", from_fn(response_time))
}
