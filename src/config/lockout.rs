//! Account lockout configuration

use chrono::Duration;
use serde::Deserialize;

use crate::domain::account::{LockoutPolicy, DEFAULT_LOCKOUT_MINUTES, DEFAULT_LOCKOUT_THRESHOLD};

use super::error::ValidationError;

/// Failed-login threshold and lockout window.
#[derive(Debug, Clone, Deserialize)]
pub struct LockoutConfig {
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
}

impl LockoutConfig {
    pub fn policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.threshold, Duration::minutes(self.duration_minutes))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.threshold == 0 {
            return Err(ValidationError::InvalidLockoutThreshold);
        }
        if self.duration_minutes <= 0 {
            return Err(ValidationError::InvalidLockoutDuration);
        }
        Ok(())
    }
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            duration_minutes: default_duration_minutes(),
        }
    }
}

fn default_threshold() -> u32 {
    DEFAULT_LOCKOUT_THRESHOLD
}

fn default_duration_minutes() -> i64 {
    DEFAULT_LOCKOUT_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_five_failures_thirty_minutes() {
        let policy = LockoutConfig::default().policy();
        assert_eq!(policy, LockoutPolicy::default());
        assert_eq!(policy.threshold(), 5);
        assert_eq!(policy.duration(), Duration::minutes(30));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero = LockoutConfig {
            threshold: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let negative = LockoutConfig {
            duration_minutes: -1,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }
}
