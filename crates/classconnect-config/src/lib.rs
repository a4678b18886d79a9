//! # ClassConnect Config
//!
//! Configuration types for the ClassConnect gateway.
//!
//! Every structure is loaded once from environment variables at startup and
//! then handed to the component that needs it. Nothing reads the environment
//! after that.
//!
//! - [`jwt`]: Session token signing configuration
//! - [`reset`]: Password reset token validity
//! - [`rate_limit`]: Fixed-window rate limiting
//! - [`cors`]: Allowed CORS origins
//! - [`auth`]: Authentication exclusions, session cookie, store timeout
//! - [`hasher`]: Argon2id cost parameters
//! - [`server`]: Listener addresses
//! - [`duration`]: Duration string parsing shared by the above
//!
//! # Example
//!
//! ```ignore
//! use classconnect_config::{JwtConfig, RateLimitConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod duration;
pub mod hasher;
pub mod jwt;
pub mod rate_limit;
pub mod reset;
pub mod server;

pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use duration::parse_duration;
pub use hasher::HasherConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use reset::ResetTokenConfig;
pub use server::ServerConfig;

/// Splits a comma-separated environment value into trimmed, non-empty items.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
