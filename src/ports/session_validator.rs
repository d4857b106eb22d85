//! Session token ports.
//!
//! The real-time layer never sees passwords; a connection proves who it is
//! with a session token issued at login. These ports keep the token scheme
//! swappable (HS256 JWT in production, a token map in tests).
//!
//! # Example Implementation
//!
//! ```ignore
//! pub struct JwtSessionService { ... }
//!
//! #[async_trait]
//! impl SessionValidator for JwtSessionService {
//!     async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
//!         // 1. Verify signature
//!         // 2. Validate iss and exp claims
//!         // 3. Map claims to AuthenticatedUser
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates session tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw session token (without "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Issues session tokens after a successful login.
pub trait SessionIssuer: Send + Sync {
    fn issue(&self, user: &AuthenticatedUser) -> Result<String, AuthError>;
}
