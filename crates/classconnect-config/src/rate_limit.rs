//! Rate limiting configuration.
//!
//! The gateway counts requests per client in fixed windows: each client may
//! send `max_requests` requests per `window`, after which requests are
//! rejected with `429 Too Many Requests` until the window elapses.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_MAX_REQUESTS`: Requests allowed per window (default: 100)
//! - `RATE_LIMIT_WINDOW`: Window length, e.g. `60s`, `1m`, `900` (default: 60s)
//!
//! # Example
//!
//! ```ignore
//! use classconnect_config::RateLimitConfig;
//!
//! let config = RateLimitConfig::from_env();
//! assert!(config.max_requests > 0);
//! ```

use std::time::Duration;

use crate::duration::parse_duration;

/// Fixed-window rate limit settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests accepted from one client within a single window.
    pub max_requests: u32,

    /// Length of a counting window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set
    /// or cannot be parsed.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_requests),
            window: std::env::var("RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|v| parse_duration(&v))
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.window),
        }
    }
}
