//! Account module - login-relevant user state and the lockout state machine.

mod record;
mod lockout;

pub use record::Account;
pub use lockout::{
    AccountSecurity, LockCheck, LockoutPolicy, LockoutStatus, DEFAULT_LOCKOUT_MINUTES,
    DEFAULT_LOCKOUT_THRESHOLD,
};
