//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Authentication Ports
//!
//! - `SessionValidator` - Resolves a session token to a user at connect time
//! - `SessionIssuer` - Issues session tokens after login
//!
//! ## Account Ports
//!
//! - `AccountRepository` - Account lookup and lockout counter persistence
//! - `PasswordVerifier` - Credential check against the stored digest

mod account_repository;
mod session_validator;

pub use account_repository::{AccountRepository, PasswordVerifier, RepositoryError};
pub use session_validator::{SessionIssuer, SessionValidator};
