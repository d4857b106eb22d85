//! Account lockout state machine.
//!
//! Repeated credential failures lock an account for a fixed window.
//! Expiry is pull-based: nothing sweeps expired locks, the next
//! [`AccountSecurity::check_lock`] observes the expiry and performs the
//! reset itself.
//!
//! ```text
//!            record_failure (count < threshold)
//!              ┌──────┐
//!              ▼      │
//!          ┌────────┐ │   record_failure (count ≥ threshold)  ┌────────┐
//!  ───────▶│ Normal │─┴──────────────────────────────────────▶│ Locked │
//!          └────────┘◀──────────────────────────────────────── └────────┘
//!               ▲        check_lock(now ≥ until) / record_success
//!               └── record_success
//! ```
//!
//! Transitions are pure: each returns the next state and the caller is
//! responsible for persisting it.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Failures that trigger a lockout.
pub const DEFAULT_LOCKOUT_THRESHOLD: u32 = 5;

/// Minutes an account stays locked.
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 30;

/// Threshold and window for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    threshold: u32,
    duration: Duration,
}

impl LockoutPolicy {
    pub fn new(threshold: u32, duration: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            duration,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_LOCKOUT_THRESHOLD,
            Duration::minutes(DEFAULT_LOCKOUT_MINUTES),
        )
    }
}

/// Observable state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Normal,
    Locked { until: Timestamp },
}

/// Counters persisted on the user record.
///
/// Invariant: `lockout_until` is set only when `failed_attempts` has
/// reached the threshold since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccountSecurity {
    failed_attempts: u32,
    lockout_until: Option<Timestamp>,
}

/// Result of [`AccountSecurity::check_lock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockCheck {
    /// True while the lockout window is still open.
    pub locked: bool,
    /// State after the check; differs from the input only when expired.
    pub state: AccountSecurity,
    /// True when this check performed the expiry reset.
    pub expired: bool,
}

impl AccountSecurity {
    /// Fresh account: no failures, no lockout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates persisted counters.
    pub fn restore(failed_attempts: u32, lockout_until: Option<Timestamp>) -> Self {
        Self {
            failed_attempts,
            lockout_until,
        }
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn lockout_until(&self) -> Option<Timestamp> {
        self.lockout_until
    }

    /// Read-only view of the state at `now`; never transitions.
    pub fn status(&self, now: Timestamp) -> LockoutStatus {
        match self.lockout_until {
            Some(until) if now.is_before(&until) => LockoutStatus::Locked { until },
            _ => LockoutStatus::Normal,
        }
    }

    /// Records a failed credential check.
    ///
    /// Reaching the threshold opens a lockout window of `policy.duration()`
    /// starting at `now`.
    pub fn record_failure(self, now: Timestamp, policy: &LockoutPolicy) -> Self {
        let failed_attempts = self.failed_attempts.saturating_add(1);
        let lockout_until = if failed_attempts >= policy.threshold() {
            Some(now.plus(policy.duration()))
        } else {
            self.lockout_until
        };
        Self {
            failed_attempts,
            lockout_until,
        }
    }

    /// Records a successful credential check: back to `Normal`.
    pub fn record_success(self) -> Self {
        Self::new()
    }

    /// Administrative unlock. Same reset as a successful login.
    pub fn unlock(self) -> Self {
        self.record_success()
    }

    /// Lockout query with lazy expiry.
    ///
    /// A window that closed at or before `now` is reset as part of this
    /// call; an open window answers `locked` without touching the counters.
    pub fn check_lock(self, now: Timestamp) -> LockCheck {
        match self.lockout_until {
            Some(until) if now.is_before(&until) => LockCheck {
                locked: true,
                state: self,
                expired: false,
            },
            Some(_) => LockCheck {
                locked: false,
                state: self.record_success(),
                expired: true,
            },
            None => LockCheck {
                locked: false,
                state: self,
                expired: false,
            },
        }
    }
}
