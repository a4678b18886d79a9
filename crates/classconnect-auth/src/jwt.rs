//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs carrying [`Claims`]. Verification pins the algorithm:
//! the `alg` field of an incoming token is never trusted, so a token signed
//! with anything other than HS256 is rejected outright.
//!
//! Expiry is reported separately from every other failure so the caller can
//! tell "log in again" apart from "this token was never valid".
//!
//! # Example
//!
//! ```ignore
//! use classconnect_auth::TokenService;
//! use classconnect_config::JwtConfig;
//!
//! let tokens = TokenService::new(&JwtConfig::from_env());
//! let token = tokens.sign("42", "alice", "admin")?;
//! let claims = tokens.verify(&token)?;
//! assert_eq!(claims.username, "alice");
//! ```

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use classconnect_config::JwtConfig;

use crate::claims::Claims;
use crate::error::AuthError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.algorithms = vec![ALGORITHM];
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expiry: config.token_expiry,
        }
    }

    /// How long freshly signed tokens stay valid.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Signs a session token for the given account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if the token cannot be encoded or its
    /// expiry does not fit in a timestamp.
    pub fn sign(&self, subject_id: &str, username: &str, role: &str) -> Result<String, AuthError> {
        let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
        let exp = now
            .checked_add(self.expiry.as_secs())
            .ok_or_else(|| AuthError::Signing("token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: subject_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            exp,
            iat: now,
        };

        self.sign_claims(&claims)
    }

    /// Signs an explicit claim set, expiry included.
    pub fn sign_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verifies a session token and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenExpired`] if the signature is valid but `exp` has passed
    /// - [`AuthError::InvalidToken`] for any other failure: bad structure,
    ///   bad signature, or an unexpected signing algorithm
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                kind => {
                    tracing::debug!(reason = ?kind, "Session token rejected");
                    AuthError::InvalidToken
                }
            })
    }
}
