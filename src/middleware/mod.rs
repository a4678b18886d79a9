//! The request pipeline.
//!
//! Every request passes through the same chain before reaching a route.
//! Outermost first:
//!
//! ```text
//! security headers → compression → rate limit → authenticate → response time → cors → routes
//! ```
//!
//! # Modules
//!
//! - [`chain`]: `Handler`, `Middleware` and ordered composition
//! - [`security_headers`]: hardening headers on every response
//! - [`compression`]: gzip response bodies
//! - [`rate_limit`]: fixed-window limiting per client
//! - [`auth`]: session authentication and the `AuthUser` extractor
//! - [`response_time`]: request logging, metrics and timing headers
//! - [`cors`]: origin allow-list and preflight handling
//!
//! A rejection at any stage is the final response: nothing further in runs.

pub mod auth;
pub mod chain;
pub mod compression;
pub mod cors;
pub mod rate_limit;
pub mod response_time;
pub mod security_headers;

use crate::state::AppState;
use chain::Chain;

/// The pipeline, listed innermost first.
pub fn pipeline(state: &AppState) -> Chain {
    Chain::new()
        .with(cors::cors_guard(state))
        .with(response_time::response_timer())
        .with(auth::authentication(state))
        .with(rate_limit::rate_limiter(state))
        .with(compression::compression())
        .with(security_headers::security_headers())
}
