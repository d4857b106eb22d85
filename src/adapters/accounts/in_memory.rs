//! In-Memory Account Repository
//!
//! Keeps accounts in a map keyed by id with a secondary email index.
//! Email lookup is case-insensitive.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::account::{Account, AccountSecurity};
use crate::domain::foundation::UserId;
use crate::ports::{AccountRepository, RepositoryError};

#[derive(Default)]
struct Store {
    accounts: HashMap<UserId, Account>,
    by_email: HashMap<String, UserId>,
}

/// In-memory storage for accounts and their lockout counters.
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account.
    pub async fn insert(&self, account: Account) {
        let mut store = self.store.write().await;
        if let Some(previous) = store.accounts.get(&account.id) {
            let old_email = normalize(&previous.email);
            store.by_email.remove(&old_email);
        }
        store
            .by_email
            .insert(normalize(&account.email), account.id.clone());
        store.accounts.insert(account.id.clone(), account);
    }

    /// Seeds the store in one call (useful for tests).
    pub async fn with_accounts(self, accounts: impl IntoIterator<Item = Account>) -> Self {
        for account in accounts {
            self.insert(account).await;
        }
        self
    }

    pub async fn account_count(&self) -> usize {
        self.store.read().await.accounts.len()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .by_email
            .get(&normalize(email))
            .and_then(|id| store.accounts.get(id))
            .cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.store.read().await.accounts.get(user_id).cloned())
    }

    async fn load_security(&self, user_id: &UserId) -> Result<AccountSecurity, RepositoryError> {
        self.store
            .read()
            .await
            .accounts
            .get(user_id)
            .map(|account| account.security)
            .ok_or_else(|| RepositoryError::NotFound(user_id.clone()))
    }

    async fn save_security(
        &self,
        user_id: &UserId,
        security: AccountSecurity,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let account = store
            .accounts
            .get_mut(user_id)
            .ok_or_else(|| RepositoryError::NotFound(user_id.clone()))?;
        account.security = security;
        Ok(())
    }
}
