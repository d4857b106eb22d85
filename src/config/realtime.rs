//! Real-time layer configuration

use serde::Deserialize;

use crate::adapters::websocket::DEFAULT_OUTBOUND_CAPACITY;
use crate::domain::dice::DEFAULT_DRAW_CAP;

use super::error::ValidationError;

/// Per-connection buffering and dice limits.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Events queued per connection before new ones are dropped
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,

    /// Maximum d10 draws for a single roll
    #[serde(default = "default_dice_draw_cap")]
    pub dice_draw_cap: usize,
}

impl RealtimeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.outbound_capacity == 0 {
            return Err(ValidationError::InvalidOutboundCapacity);
        }
        if self.dice_draw_cap < 2 {
            return Err(ValidationError::InvalidDrawCap);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: default_outbound_capacity(),
            dice_draw_cap: default_dice_draw_cap(),
        }
    }
}

fn default_outbound_capacity() -> usize {
    DEFAULT_OUTBOUND_CAPACITY
}

fn default_dice_draw_cap() -> usize {
    DEFAULT_DRAW_CAP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RealtimeConfig::default();
        assert_eq!(config.dice_draw_cap, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = RealtimeConfig {
            outbound_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidOutboundCapacity)));
    }

    #[test]
    fn draw_cap_must_fit_one_pair() {
        let config = RealtimeConfig {
            dice_draw_cap: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidDrawCap)));
    }
}
