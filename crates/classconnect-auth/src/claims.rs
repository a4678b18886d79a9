//! Session token claims and the identity derived from them.
//!
//! - [`Claims`]: what is signed into a session token
//! - [`Identity`]: what the authentication middleware hands to handlers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JWT claims carried by a session token.
///
/// Claims are self-contained: nothing about a session is stored server-side,
/// so everything a handler may need to know about the caller lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier (subject claim)
    pub sub: String,
    /// Login name of the account
    pub username: String,
    /// Role used by authorization checks
    pub role: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: u64,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: u64,
}

/// Request-scoped identity established by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub subject_id: String,
    pub username: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        let expires_at = i64::try_from(claims.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default();

        Self {
            subject_id: claims.sub,
            username: claims.username,
            role: claims.role,
            expires_at,
        }
    }
}
