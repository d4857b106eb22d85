//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod account;

pub use account::{LoginCommand, LoginError, LoginHandler, LoginResult};
