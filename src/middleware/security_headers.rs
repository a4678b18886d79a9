//! Hardening headers set on every response.

use axum::http::{HeaderName, HeaderValue, header};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

use super::chain::Middleware;

/// Applied to every response, replacing any value set further in.
pub const SECURITY_HEADERS: [(HeaderName, &str); 6] = [
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::CONTENT_SECURITY_POLICY, "default-src 'self'"),
    (header::REFERRER_POLICY, "no-referrer"),
];

fn overriding(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

pub fn security_headers() -> Middleware {
    let [dns, frame, xss, sniff, csp, referrer] = SECURITY_HEADERS;

    Middleware::from_layer(
        "security_headers",
        ServiceBuilder::new()
            .layer(overriding(dns.0, dns.1))
            .layer(overriding(frame.0, frame.1))
            .layer(overriding(xss.0, xss.1))
            .layer(overriding(sniff.0, sniff.1))
            .layer(overriding(csp.0, csp.1))
            .layer(overriding(referrer.0, referrer.1)),
    )
}
