use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};

use classconnect_auth::reset::{digest_reset_token, generate_reset_token};
use classconnect_auth::{AuthError, Claims, CredentialHasher, TokenService};
use classconnect_config::{HasherConfig, JwtConfig};

/// Outcome of inspecting a session token.
#[derive(Debug)]
pub enum TokenReport {
    Valid(Claims),
    Expired,
    Invalid,
}

/// A freshly generated reset token and the digest a store would keep.
#[derive(Debug)]
pub struct ResetTokenPair {
    pub plaintext: String,
    pub digest: String,
}

pub fn hash_password(config: &HasherConfig, password: &str) -> Result<String> {
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let hasher = CredentialHasher::new(config).context("Invalid hasher configuration")?;
    hasher.hash(password).context("Failed to hash password")
}

pub fn sign_token(config: &JwtConfig, subject: &str, username: &str, role: &str) -> Result<String> {
    TokenService::new(config)
        .sign(subject, username, role)
        .context("Failed to sign token")
}

pub fn verify_token(config: &JwtConfig, token: &str) -> TokenReport {
    match TokenService::new(config).verify(token) {
        Ok(claims) => TokenReport::Valid(claims),
        Err(AuthError::TokenExpired) => TokenReport::Expired,
        Err(_) => TokenReport::Invalid,
    }
}

pub fn reset_token() -> ResetTokenPair {
    let plaintext = generate_reset_token();
    let digest = digest_reset_token(&plaintext);
    ResetTokenPair { plaintext, digest }
}

pub fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| secs.to_string())
}
