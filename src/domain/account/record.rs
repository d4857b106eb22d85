//! User record fields the authentication path reads.

use crate::domain::foundation::{AuthenticatedUser, UserId};

use super::AccountSecurity;

/// Subset of a forum user relevant to logging in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Stored password digest, verified through the `PasswordVerifier` port.
    pub password_hash: String,
    pub roles: Vec<String>,
    /// Deactivated accounts cannot log in.
    pub active: bool,
    pub banned: bool,
    pub security: AccountSecurity,
}

impl Account {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            roles: Vec::new(),
            active: true,
            banned: false,
            security: AccountSecurity::new(),
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Principal handed to the session layer after a successful login.
    pub fn to_authenticated_user(&self) -> AuthenticatedUser {
        AuthenticatedUser::new(
            self.id.clone(),
            self.username.clone(),
            self.email.clone(),
            self.roles.clone(),
        )
    }
}
