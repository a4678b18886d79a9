use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Account, CredentialStore, ResetTicket, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    // token digest -> (account id, ticket)
    reset_tokens: HashMap<String, (String, ResetTicket)>,
}

/// Process-local credential store, used by the binary and by tests.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an account.
    pub async fn create_account(&self, account: Account) {
        let mut inner = self.inner.write().await;
        inner.accounts.insert(account.id.clone(), account);
    }

    pub async fn reset_token_count(&self) -> usize {
        self.inner.read().await.reset_tokens.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn store_reset_token(&self, account_id: &str, ticket: ResetTicket) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(account_id) {
            return Err(StoreError::AccountNotFound(account_id.to_string()));
        }

        inner.reset_tokens.retain(|_, (owner, _)| owner != account_id);
        inner
            .reset_tokens
            .insert(ticket.token_hash.clone(), (account_id.to_string(), ticket));
        Ok(())
    }

    async fn take_reset_token(
        &self,
        token_hash: &str,
    ) -> StoreResult<Option<(Account, ResetTicket)>> {
        let mut inner = self.inner.write().await;
        let Some((account_id, ticket)) = inner.reset_tokens.remove(token_hash) else {
            return Ok(None);
        };

        Ok(inner
            .accounts
            .get(&account_id)
            .cloned()
            .map(|account| (account, ticket)))
    }

    async fn update_password(
        &self,
        account_id: &str,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| StoreError::AccountNotFound(account_id.to_string()))?;

        account.password_hash = password_hash.to_string();
        account.password_changed_at = Some(changed_at);
        Ok(())
    }
}
