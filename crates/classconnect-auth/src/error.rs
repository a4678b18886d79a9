//! Authentication and credential errors.

use classconnect_core::{AppError, StatusCode};
use thiserror::Error;

use crate::store::StoreError;

/// Every way a credential or session operation can fail.
///
/// Client-facing messages are deliberately coarse: they name the category of
/// failure (missing, expired, invalid, forbidden) and nothing more.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token missing")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid session token")]
    InvalidToken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password verification failed")]
    VerificationFailed,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("User not authorized")]
    Forbidden,

    #[error("Invalid reset token")]
    ResetTokenNotFound,

    #[error("Reset token has expired")]
    ResetTokenExpired,

    #[error("Credential store timed out")]
    StoreTimeout,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to sign session token: {0}")]
    Signing(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::InvalidCredentials
            | AuthError::VerificationFailed => StatusCode::UNAUTHORIZED,
            AuthError::AccountInactive | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::ResetTokenNotFound | AuthError::ResetTokenExpired => {
                StatusCode::BAD_REQUEST
            }
            AuthError::StoreTimeout
            | AuthError::Store(_)
            | AuthError::Signing(_)
            | AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::new(err.status(), err)
    }
}
