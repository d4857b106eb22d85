//! HS256 session tokens.
//!
//! Implements both session ports with one shared secret: tokens are issued
//! after a successful login and validated on WebSocket upgrade.
//!
//! # Security
//!
//! Validation checks:
//! - **Signature**: HS256 with the configured secret
//! - **Issuer (iss)**: Must match the configured issuer
//! - **Expiry (exp)**: Must be in the future
//!
//! # Example
//!
//! ```ignore
//! let service = JwtSessionService::new(JwtConfig::new(secret, "lotusrpg", 720));
//! let token = service.issue(&user)?;
//! let same_user = service.validate(&token).await?;
//! ```

use async_trait::async_trait;
use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};
use crate::ports::{SessionIssuer, SessionValidator};

/// Settings for [`JwtSessionService`].
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub issuer: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: SecretString, issuer: impl Into<String>, ttl_minutes: i64) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            ttl: Duration::minutes(ttl_minutes),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Subject - the user ID
    sub: String,
    iss: String,
    exp: i64,
    iat: i64,
    username: String,
    email: String,
    #[serde(default)]
    roles: Vec<String>,
}

/// Issues and validates signed session tokens.
pub struct JwtSessionService {
    issuer: String,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtSessionService {
    pub fn new(config: JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer,
            ttl: config.ttl,
        }
    }

    /// Issues a token as if it were `issued_at`.
    pub fn issue_at(&self, user: &AuthenticatedUser, issued_at: Timestamp) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: user.id.to_string(),
            iss: self.issuer.clone(),
            exp: issued_at.plus(self.ttl).as_unix_secs(),
            iat: issued_at.as_unix_secs(),
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            AuthError::IssuanceFailed(e.to_string())
        })
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Invalid issuer in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionService {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.decode_claims(token)?;
        let id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(id, claims.username, claims.email, claims.roles))
    }
}

impl SessionIssuer for JwtSessionService {
    fn issue(&self, user: &AuthenticatedUser) -> Result<String, AuthError> {
        self.issue_at(user, Timestamp::now())
    }
}
