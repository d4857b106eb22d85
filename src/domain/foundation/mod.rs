//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the LotusRPG real-time layer.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser, ADMIN_ROLE};
pub use errors::ValidationError;
pub use ids::{ConnectionId, RoomName, UserId};
pub use timestamp::Timestamp;
