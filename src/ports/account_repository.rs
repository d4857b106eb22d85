//! Account repository port - user lookup and lockout counter persistence.
//!
//! Forum content persistence is elsewhere; this port only covers what the
//! login flow reads and the lockout transitions write back.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::account::{Account, AccountSecurity};
use crate::domain::foundation::UserId;

/// Storage failures surfaced by repository adapters.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("Account not found: {0}")]
    NotFound(UserId),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Port for reading accounts and persisting lockout counters.
///
/// Implementations do not need to serialize concurrent writers for the
/// same account; the login handler holds a per-account lock around every
/// load/transition/save sequence.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Looks an account up by login email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError>;

    /// Looks an account up by id.
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<Account>, RepositoryError>;

    /// Loads the current lockout counters.
    async fn load_security(&self, user_id: &UserId) -> Result<AccountSecurity, RepositoryError>;

    /// Persists the counters returned by a lockout transition.
    async fn save_security(
        &self,
        user_id: &UserId,
        security: AccountSecurity,
    ) -> Result<(), RepositoryError>;
}

/// Port for checking a password against its stored digest.
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}
