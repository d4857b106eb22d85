//! LoginHandler - Credential check guarded by the lockout state machine.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::account::{Account, AccountSecurity, LockoutPolicy};
use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};
use crate::ports::{AccountRepository, PasswordVerifier, RepositoryError, SessionIssuer};

/// Command to log in.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: AuthenticatedUser,
    pub token: String,
}

/// Why a login or unlock was refused.
#[derive(Debug, Clone, Error)]
pub enum LoginError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account temporarily locked until {}", .until.to_rfc3339())]
    AccountLocked { until: Timestamp },

    #[error("Account has been banned")]
    AccountBanned,

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("Account not found")]
    AccountNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Token(#[from] AuthError),
}

/// Handler for logging in and for administrative unlocks.
///
/// Every read-transition-write of an account's lockout counters runs under
/// that account's lock, so concurrent attempts never lose a failure.
pub struct LoginHandler {
    accounts: Arc<dyn AccountRepository>,
    verifier: Arc<dyn PasswordVerifier>,
    issuer: Arc<dyn SessionIssuer>,
    policy: LockoutPolicy,
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl LoginHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        verifier: Arc<dyn PasswordVerifier>,
        issuer: Arc<dyn SessionIssuer>,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            accounts,
            verifier,
            issuer,
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn handle(&self, cmd: LoginCommand, now: Timestamp) -> Result<LoginResult, LoginError> {
        // 1. Resolve account
        let account = self
            .accounts
            .find_by_email(&cmd.email)
            .await?
            .ok_or(LoginError::InvalidCredentials)?;

        // 2. Standing checks
        if account.banned {
            tracing::info!(user_id = %account.id, "login refused: banned");
            return Err(LoginError::AccountBanned);
        }
        if !account.active {
            tracing::info!(user_id = %account.id, "login refused: deactivated");
            return Err(LoginError::AccountInactive);
        }

        // 3. Lockout check and credential check, atomically per account
        let lock = self.account_lock(&account.id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.attempt(&account, &cmd.password, now).await
        };
        self.release_lock(&account.id, lock).await;
        let user = outcome?;

        // 4. Success
        let token = self.issuer.issue(&user)?;
        tracing::info!(user_id = %account.id, "login succeeded");

        Ok(LoginResult { user, token })
    }

    /// Clears an account's failures and lockout window.
    ///
    /// Returns the unlocked account.
    pub async fn unlock(&self, user_id: &UserId) -> Result<Account, LoginError> {
        let lock = self.account_lock(user_id).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.clear_lockout(user_id).await
        };
        self.release_lock(user_id, lock).await;
        let account = outcome?;

        tracing::info!(user_id = %user_id, "account unlocked");
        Ok(account)
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Runs under the account lock: lockout check, credential check and
    /// the resulting transition.
    async fn attempt(
        &self,
        account: &Account,
        password: &str,
        now: Timestamp,
    ) -> Result<AuthenticatedUser, LoginError> {
        let current = self.accounts.load_security(&account.id).await?;
        let check = current.check_lock(now);
        if check.expired {
            tracing::info!(user_id = %account.id, "lockout expired, counters reset");
            self.accounts.save_security(&account.id, check.state).await?;
        }
        if check.locked {
            let until = check.state.lockout_until().unwrap_or(now);
            tracing::info!(user_id = %account.id, until = %until.to_rfc3339(), "login refused: locked");
            return Err(LoginError::AccountLocked { until });
        }

        if !self.verifier.verify(password, &account.password_hash) {
            let next = check.state.record_failure(now, &self.policy);
            self.accounts.save_security(&account.id, next).await?;
            log_failure(account, next);
            return Err(LoginError::InvalidCredentials);
        }

        self.accounts
            .save_security(&account.id, check.state.record_success())
            .await?;
        Ok(account.to_authenticated_user())
    }

    async fn clear_lockout(&self, user_id: &UserId) -> Result<Account, LoginError> {
        let mut account = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or(LoginError::AccountNotFound)?;
        let security = self.accounts.load_security(user_id).await?.unlock();
        self.accounts.save_security(user_id, security).await?;
        account.security = security;
        Ok(account)
    }

    async fn account_lock(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(user_id.clone()).or_default())
    }

    /// Drops the map entry once no other caller holds or waits on it.
    ///
    /// Clones are only taken under the map lock, so a count of one here
    /// means the entry is idle.
    async fn release_lock(&self, user_id: &UserId, lock: Arc<Mutex<()>>) {
        drop(lock);
        let mut locks = self.locks.lock().await;
        if locks.get(user_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(user_id);
        }
    }

    #[cfg(test)]
    async fn tracked_locks(&self) -> usize {
        self.locks.lock().await.len()
    }
}

fn log_failure(account: &Account, state: AccountSecurity) {
    match state.lockout_until() {
        Some(until) => tracing::warn!(
            user_id = %account.id,
            failed_attempts = state.failed_attempts(),
            until = %until.to_rfc3339(),
            "account locked after repeated failures"
        ),
        None => tracing::info!(
            user_id = %account.id,
            failed_attempts = state.failed_attempts(),
            "login failed"
        ),
    }
}
