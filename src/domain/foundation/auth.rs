//! Authentication types for the domain layer.
//!
//! These types represent an authenticated user extracted from a session
//! token. They have **no external dependencies** - any token scheme can
//! populate them via the `SessionValidator` port.
//!
//! # Example
//!
//! ```ignore
//! // In the WebSocket upgrade, after token validation:
//! let user = AuthenticatedUser::new(
//!     UserId::new("17")?,
//!     "alice",
//!     "alice@example.com",
//!     vec!["admin".to_string()],
//! );
//! sessions.bind(connection_id, SessionIdentity::from_user(&user)).await;
//! ```

use super::UserId;
use thiserror::Error;

/// Role name that grants the admin capability.
pub const ADMIN_ROLE: &str = "admin";

/// Authenticated user extracted from a validated session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier.
    pub id: UserId,

    /// Public username shown next to dice rolls and editor changes.
    pub username: String,

    /// User's email address.
    pub email: String,

    /// Role names held by the user (`admin`, `moderator`, ...).
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        roles: Vec<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            roles,
        }
    }

    /// Returns true if the user holds the named role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// The token could not be produced.
    #[error("Token issuance failed: {0}")]
    IssuanceFailed(String),
}

impl AuthError {
    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(roles: Vec<String>) -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new("user-123").unwrap(), "alice", "a@example.com", roles)
    }

    #[test]
    fn authenticated_user_new_creates_user() {
        let user = test_user(vec![]);
        assert_eq!(user.id.as_str(), "user-123");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@example.com");
    }

    #[test]
    fn has_role_matches_exact_name() {
        let user = test_user(vec![ADMIN_ROLE.to_string()]);
        assert!(user.has_role("admin"));
        assert!(!user.has_role("Admin"));
        assert!(!test_user(vec![]).has_role("admin"));
    }

    #[test]
    fn auth_error_requires_reauthentication_for_token_errors() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::IssuanceFailed("x".into()).requires_reauthentication());
    }
}
