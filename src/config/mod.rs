//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `LOTUSRPG` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use lotusrpg_realtime::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod error;
mod lockout;
mod realtime;
mod server;

pub use auth::{AuthConfig, MIN_SECRET_LEN};
pub use error::{ConfigError, ValidationError};
pub use lockout::LockoutConfig;
pub use realtime::RealtimeConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address, environment and log filter
    #[serde(default)]
    pub server: ServerConfig,

    /// Session token signing and password pepper
    pub auth: AuthConfig,

    /// Outbound buffering and dice limits
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Failed-login lockout policy
    #[serde(default)]
    pub lockout: LockoutConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `LOTUSRPG` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// # Environment Variable Format
    ///
    /// - `LOTUSRPG__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LOTUSRPG__AUTH__SESSION_SECRET=...` -> `auth.session_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("LOTUSRPG")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.realtime.validate()?;
        self.lockout.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("LOTUSRPG__AUTH__SESSION_SECRET", "0123456789abcdef0123456789abcdef");
        env::set_var("LOTUSRPG__AUTH__PASSWORD_PEPPER", "pepper");
    }

    fn clear_env() {
        for key in [
            "LOTUSRPG__AUTH__SESSION_SECRET",
            "LOTUSRPG__AUTH__PASSWORD_PEPPER",
            "LOTUSRPG__SERVER__PORT",
            "LOTUSRPG__SERVER__ENVIRONMENT",
            "LOTUSRPG__LOCKOUT__THRESHOLD",
            "LOTUSRPG__REALTIME__OUTBOUND_CAPACITY",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config should load");
        assert_eq!(
            config.auth.session_secret.expose_secret(),
            "0123456789abcdef0123456789abcdef"
        );
        assert_eq!(config.auth.issuer, "lotusrpg");
    }

    #[test]
    fn test_defaults_validate() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.lockout.threshold, 5);
        assert_eq!(config.realtime.outbound_capacity, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_secret_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("LOTUSRPG__SERVER__PORT", "3000");
        env::set_var("LOTUSRPG__SERVER__ENVIRONMENT", "production");
        env::set_var("LOTUSRPG__LOCKOUT__THRESHOLD", "3");
        env::set_var("LOTUSRPG__REALTIME__OUTBOUND_CAPACITY", "16");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.lockout.threshold, 3);
        assert_eq!(config.realtime.outbound_capacity, 16);
    }
}
