//! LotusRPG Realtime - Rooms, dice and account lockout for the LotusRPG forum
//!
//! This crate pushes forum activity to connected clients over WebSockets,
//! resolves the exploding double-ten dice mechanic, and guards logins with a
//! failed-attempt lockout.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
