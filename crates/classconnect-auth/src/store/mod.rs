//! Credential store collaborator.
//!
//! The gateway does not own persistence. Everything it needs to know about
//! accounts and outstanding reset tokens comes through [`CredentialStore`],
//! and every call is bounded by the configured store timeout.

mod memory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::error::AuthError;

pub use memory::InMemoryCredentialStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// A login-capable account as the gateway sees it.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub password_hash: String,
    pub inactive: bool,
    pub password_changed_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("password_hash", &"[redacted]")
            .field("inactive", &self.inactive)
            .field("password_changed_at", &self.password_changed_at)
            .finish()
    }
}

/// A stored reset token. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    pub token_hash: String,
    pub issued_at: DateTime<Utc>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Records a reset ticket for an account, replacing any earlier one.
    async fn store_reset_token(&self, account_id: &str, ticket: ResetTicket) -> StoreResult<()>;

    /// Removes and returns the ticket with the given digest, if any.
    ///
    /// Removal and lookup happen together so a ticket can be taken at most once.
    async fn take_reset_token(&self, token_hash: &str)
    -> StoreResult<Option<(Account, ResetTicket)>>;

    async fn update_password(
        &self,
        account_id: &str,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}

/// Runs a store call under a deadline.
pub async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, AuthError>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(AuthError::from),
        Err(_) => {
            tracing::warn!(timeout = ?timeout, "Credential store call timed out");
            Err(AuthError::StoreTimeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let result = bounded(Duration::from_millis(100), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_bounded_maps_store_error() {
        let result: Result<(), _> = bounded(Duration::from_millis(100), async {
            Err(StoreError::Unavailable("down".to_string()))
        })
        .await;
        assert!(matches!(result, Err(AuthError::Store(StoreError::Unavailable(_)))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result = bounded(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, StoreError>(())
        })
        .await;
        assert!(matches!(result, Err(AuthError::StoreTimeout)));
    }

    #[test]
    fn test_account_debug_redacts_hash() {
        let account = Account {
            id: "1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            inactive: false,
            password_changed_at: None,
        };
        let debug = format!("{account:?}");
        assert!(!debug.contains("$argon2id$secret"));
        assert!(debug.contains("[redacted]"));
    }
}
