//! # ClassConnect Gateway
//!
//! The request pipeline in front of the ClassConnect school-administration
//! API, together with the session and credential endpoints it depends on.
//!
//! ## Overview
//!
//! Every inbound request passes through a fixed chain before it reaches a
//! route:
//!
//! ```text
//! security headers → compression → rate limit → authenticate → response time → cors → routes
//! ```
//!
//! The response travels back out through the same chain in reverse. A
//! rejection at any stage (rate limit, missing or invalid session, disallowed
//! origin) is the final response.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Pipeline composition and each pipeline stage
//! ├── modules/
//! │   └── auth/         # Login, logout, password change, password reset
//! ├── logging.rs        # Tracing subscriber setup
//! ├── metrics.rs        # Prometheus recorder and metric helpers
//! ├── router.rs         # Routes and the pipeline around them
//! ├── state.rs          # Shared application state
//! └── validator.rs      # Validated JSON extractor
//! ```
//!
//! Credential primitives (token signing, password hashing, reset tokens,
//! the credential store contract) live in `classconnect-auth`.
//!
//! ## Sessions
//!
//! - Session tokens are HS256 JWTs, valid for 15 minutes by default
//!   (`JWT_EXPIRES_IN`)
//! - The token travels in an HTTP-only cookie named `Bearer`
//!   (`SESSION_COOKIE_NAME`) or an `Authorization: Bearer` header
//! - Nothing about a session is stored server-side
//!
//! ## Modules
//!
//! - [`logging`]: Tracing and log files
//! - [`metrics`]: Prometheus metrics endpoint
//! - [`middleware`]: The request pipeline
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`validator`]: Request validation utilities

pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use classconnect_auth;
pub use classconnect_config;
pub use classconnect_core;
