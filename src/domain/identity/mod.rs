//! Identity module - who is behind a connection and what they may do.

mod capability;
mod session_identity;

pub use capability::{Capability, CapabilitySet};
pub use session_identity::{Identity, SessionIdentity};
