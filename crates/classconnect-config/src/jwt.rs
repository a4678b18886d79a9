use std::env;
use std::time::Duration;

use crate::duration::parse_duration;

/// Session tokens are valid for 15 minutes unless configured otherwise.
pub const DEFAULT_TOKEN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Longest accepted session lifetime; anything longer counts as malformed.
pub const MAX_TOKEN_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub token_expiry: Duration,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "your-secret-key-change-in-production".to_string(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            token_expiry: token_expiry_or_default(env::var("JWT_EXPIRES_IN").ok().as_deref()),
        }
    }
}

/// Absent and malformed values both fall back to [`DEFAULT_TOKEN_EXPIRY`].
/// Zero and anything past [`MAX_TOKEN_EXPIRY`] are malformed.
pub fn token_expiry_or_default(raw: Option<&str>) -> Duration {
    raw.and_then(parse_duration)
        .filter(|d| !d.is_zero() && *d <= MAX_TOKEN_EXPIRY)
        .unwrap_or(DEFAULT_TOKEN_EXPIRY)
}
