//! One-time password reset tokens.
//!
//! A reset token is 32 random bytes, hex-encoded, handed to the account owner
//! out of band. Only its SHA-256 digest reaches the credential store. Each
//! account holds at most one live token: issuing a new one replaces the old.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::instrument;

use classconnect_config::ResetTokenConfig;

use crate::error::AuthError;
use crate::jwt::TokenService;
use crate::password::CredentialHasher;
use crate::store::{CredentialStore, ResetTicket, bounded};

pub const RESET_TOKEN_BYTES: usize = 32;

/// SHA-256 digest of a plaintext reset token, hex-encoded.
pub fn digest_reset_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// A fresh random reset token, hex-encoded.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct ResetTokenManager {
    store: Arc<dyn CredentialStore>,
    hasher: CredentialHasher,
    tokens: TokenService,
    validity: Duration,
    store_timeout: Duration,
}

impl ResetTokenManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: CredentialHasher,
        tokens: TokenService,
        config: &ResetTokenConfig,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            validity: config.validity,
            store_timeout,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issues a reset token for an account and returns the plaintext.
    ///
    /// The plaintext is never logged or stored. Any earlier token for the
    /// same account stops working.
    #[instrument(skip(self))]
    pub async fn issue_reset_token(&self, account_id: &str) -> Result<String, AuthError> {
        let plaintext = generate_reset_token();
        let ticket = ResetTicket {
            token_hash: digest_reset_token(&plaintext),
            issued_at: Utc::now(),
        };

        bounded(
            self.store_timeout,
            self.store.store_reset_token(account_id, ticket),
        )
        .await?;

        tracing::info!(account_id = %account_id, "Password reset token issued");
        Ok(plaintext)
    }

    /// Consumes a reset token, sets the new password and returns a fresh session token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ResetTokenNotFound`] when no live token matches, including
    ///   a token that was already used
    /// - [`AuthError::ResetTokenExpired`] when the token matched but its
    ///   validity has elapsed
    #[instrument(skip_all)]
    pub async fn consume_reset_token(
        &self,
        plaintext: &str,
        new_password: &str,
    ) -> Result<String, AuthError> {
        self.consume_at(plaintext, new_password, Utc::now()).await
    }

    async fn consume_at(
        &self,
        plaintext: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let token_hash = digest_reset_token(plaintext);

        // The ticket leaves the store here. Only a failed password update puts it back.
        let (account, ticket) = bounded(self.store_timeout, self.store.take_reset_token(&token_hash))
            .await?
            .ok_or(AuthError::ResetTokenNotFound)?;

        if self.is_expired(&ticket, now) {
            tracing::info!(account_id = %account.id, "Expired password reset token presented");
            return Err(AuthError::ResetTokenExpired);
        }

        if let Err(err) = self.replace_password(&account.id, new_password, now).await {
            self.restore(&account.id, ticket).await;
            return Err(err);
        }

        tracing::info!(account_id = %account.id, "Password reset completed");
        self.tokens.sign(&account.id, &account.username, &account.role)
    }

    async fn replace_password(
        &self,
        account_id: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let password_hash = self.hasher.spawn_hash(new_password).await?;
        bounded(
            self.store_timeout,
            self.store.update_password(account_id, &password_hash, now),
        )
        .await
    }

    /// Puts a taken ticket back after a failed reset, keeping its original issue time.
    async fn restore(&self, account_id: &str, ticket: ResetTicket) {
        if let Err(err) = bounded(
            self.store_timeout,
            self.store.store_reset_token(account_id, ticket),
        )
        .await
        {
            tracing::error!(account_id = %account_id, error = %err, "Failed to restore reset token");
        }
    }

    fn is_expired(&self, ticket: &ResetTicket, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(self.validity) {
            Ok(validity) => now >= ticket.issued_at + validity,
            Err(_) => false,
        }
    }
}
