//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::adapters::auth::JwtConfig;

use super::error::ValidationError;
use super::server::Environment;

/// Minimum session secret length outside development.
pub const MIN_SECRET_LEN: usize = 32;

/// Session token and password digest settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens
    pub session_secret: SecretString,

    /// `iss` claim written into and required on session tokens
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Session token lifetime in minutes
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,

    /// Pepper mixed into every password digest
    pub password_pepper: SecretString,

    /// Admin account seeded into the in-memory store at startup
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,

    #[serde(default)]
    pub bootstrap_admin_password: Option<SecretString>,
}

impl AuthConfig {
    /// Signing settings for the session token service.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.session_secret.clone(), self.issuer.clone(), self.token_ttl_minutes)
    }

    /// Validate authentication configuration
    ///
    /// Outside development, the session secret must be at least
    /// [`MIN_SECRET_LEN`] bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.session_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SESSION_SECRET"));
        }
        if *environment != Environment::Development && secret.len() < MIN_SECRET_LEN {
            return Err(ValidationError::SessionSecretTooShort(MIN_SECRET_LEN));
        }
        if self.password_pepper.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__PASSWORD_PEPPER"));
        }
        if self.token_ttl_minutes <= 0 {
            return Err(ValidationError::InvalidTokenTtl);
        }
        if self.bootstrap_admin_email.is_some() && self.bootstrap_admin_password.is_none() {
            return Err(ValidationError::MissingRequired("AUTH__BOOTSTRAP_ADMIN_PASSWORD"));
        }
        Ok(())
    }
}

fn default_issuer() -> String {
    "lotusrpg".to_string()
}

fn default_token_ttl() -> i64 {
    12 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, pepper: &str) -> AuthConfig {
        AuthConfig {
            session_secret: SecretString::new(secret.to_string()),
            issuer: default_issuer(),
            token_ttl_minutes: default_token_ttl(),
            password_pepper: SecretString::new(pepper.to_string()),
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }

    #[test]
    fn short_secret_is_fine_in_development() {
        assert!(config("dev", "pepper").validate(&Environment::Development).is_ok());
    }

    #[test]
    fn short_secret_fails_in_production() {
        let result = config("dev", "pepper").validate(&Environment::Production);
        assert!(matches!(result, Err(ValidationError::SessionSecretTooShort(_))));
    }

    #[test]
    fn long_secret_passes_in_production() {
        let secret = "x".repeat(MIN_SECRET_LEN);
        assert!(config(&secret, "pepper").validate(&Environment::Production).is_ok());
    }

    #[test]
    fn empty_values_are_missing() {
        assert!(matches!(
            config("", "pepper").validate(&Environment::Development),
            Err(ValidationError::MissingRequired(_))
        ));
        assert!(matches!(
            config("secret", "").validate(&Environment::Development),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn non_positive_ttl_is_rejected() {
        let mut config = config("secret", "pepper");
        config.token_ttl_minutes = 0;
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidTokenTtl)
        ));
    }

    #[test]
    fn bootstrap_email_needs_a_password() {
        let mut config = config("secret", "pepper");
        config.bootstrap_admin_email = Some("gm@example.com".into());
        assert!(config.validate(&Environment::Development).is_err());

        config.bootstrap_admin_password = Some(SecretString::new("hunter2".into()));
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?}", config("top-secret-value", "pepper-value"));
        assert!(!rendered.contains("top-secret-value"));
        assert!(!rendered.contains("pepper-value"));
    }
}
