//! Role checks.
//!
//! Authentication only establishes who the caller is. Handlers that restrict
//! access to particular roles call [`authorize`] themselves.

use crate::error::AuthError;

/// Allows `role` if it is one of `allowed`.
pub fn authorize(role: &str, allowed: &[&str]) -> Result<(), AuthError> {
    if allowed.iter().any(|candidate| *candidate == role) {
        Ok(())
    } else {
        tracing::debug!(role = %role, ?allowed, "Role not authorized");
        Err(AuthError::Forbidden)
    }
}
