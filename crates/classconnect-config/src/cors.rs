use std::env;

use crate::split_list;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    /// Let requests without an `Origin` header through. Off by default, so
    /// they are rejected like any other unlisted origin.
    pub allow_missing_origin: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            allow_missing_origin: false,
        }
    }
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.allowed_origins),
            allow_missing_origin: parse_flag(env::var("CORS_ALLOW_MISSING_ORIGIN").ok().as_deref()),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes")
    )
}
