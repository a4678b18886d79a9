//! Authentication middleware configuration.

use std::env;
use std::time::Duration;

use crate::duration::parse_duration;
use crate::split_list;

pub const DEFAULT_SESSION_COOKIE: &str = "Bearer";

/// Where the session token lives and which paths skip authentication.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Requests whose path starts with any of these prefixes bypass authentication.
    pub excluded_paths: Vec<String>,
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
    /// Upper bound on a single credential store call.
    pub store_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            excluded_paths: vec![
                "/auth/login".to_string(),
                "/auth/logout".to_string(),
                "/auth/forgot-password".to_string(),
                "/auth/reset-password".to_string(),
                "/health".to_string(),
            ],
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            excluded_paths: env::var("AUTH_EXCLUDED_PATHS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.excluded_paths),
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cookie_name),
            store_timeout: env::var("STORE_TIMEOUT")
                .ok()
                .and_then(|v| parse_duration(&v))
                .filter(|d| !d.is_zero())
                .unwrap_or(defaults.store_timeout),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let config = AuthConfig::default();
        assert!(config.is_excluded("/auth/login"));
        assert!(config.is_excluded("/auth/reset-password/abc123"));
        assert!(config.is_excluded("/health"));
        assert!(!config.is_excluded("/auth/me"));
        assert!(!config.is_excluded("/teachers"));
    }

    #[test]
    fn test_empty_exclusions() {
        let config = AuthConfig {
            excluded_paths: vec![],
            ..AuthConfig::default()
        };
        assert!(!config.is_excluded("/auth/login"));
    }
}
