//! Response compression.
//!
//! Bodies are gzip-compressed when the client sends `Accept-Encoding: gzip`
//! and the response is worth compressing (not tiny, not already an image or
//! event stream).

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use tower::ServiceBuilder;
use tower_http::compression::{CompressionBody, CompressionLayer};

use super::chain::Middleware;

pub fn compression() -> Middleware {
    Middleware::from_layer(
        "compression",
        ServiceBuilder::new()
            .map_response(|response: Response<CompressionBody<Body>>| response.into_response())
            .layer(CompressionLayer::new()),
    )
}
