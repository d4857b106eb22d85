//! HTTP adapters - REST API implementations.
//!
//! - `account` - Login and account moderation
//! - `health` - Liveness and connection counters
//! - `middleware` - Bearer token authentication

pub mod account;
pub mod health;
pub mod middleware;

pub use account::{account_routes, AccountHandlers};
pub use health::health_router;
