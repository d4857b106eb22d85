//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("CORS origin is not a valid header value: {0}")]
    InvalidCorsOrigin(String),

    #[error("Session secret must be at least {0} bytes")]
    SessionSecretTooShort(usize),

    #[error("Session token TTL must be positive")]
    InvalidTokenTtl,

    #[error("Outbound buffer capacity must be positive")]
    InvalidOutboundCapacity,

    #[error("Dice draw cap must be at least 2")]
    InvalidDrawCap,

    #[error("Lockout threshold must be positive")]
    InvalidLockoutThreshold,

    #[error("Lockout duration must be positive")]
    InvalidLockoutDuration,
}
