//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `accounts` - Account storage
//! - `auth` - Session token issuance and validation
//! - `credentials` - Password digest verification
//! - `http` - REST endpoints
//! - `websocket` - Real-time rooms and client interactions

pub mod accounts;
pub mod auth;
pub mod credentials;
pub mod http;
pub mod websocket;
