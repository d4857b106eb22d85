//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `identity` - Session identity and capability sets
//! - `dice` - Exploding double-ten resolution
//! - `account` - Login-relevant account state and the lockout state machine

pub mod account;
pub mod dice;
pub mod foundation;
pub mod identity;
