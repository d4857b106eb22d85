//! HTTP DTOs for login and account moderation endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::account::Account;
use crate::domain::foundation::AuthenticatedUser;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to log in.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<AuthenticatedUser> for UserResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            roles: user.roles,
        }
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Response for account moderation commands.
#[derive(Debug, Clone, Serialize)]
pub struct AccountCommandResponse {
    pub user_id: String,
    pub username: String,
    pub message: String,
}

impl AccountCommandResponse {
    pub fn unlocked(account: &Account) -> Self {
        Self {
            user_id: account.id.to_string(),
            username: account.username.clone(),
            message: "Account unlocked".to_string(),
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[test]
    fn login_request_deserializes() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"pw"}"#).unwrap();
        assert_eq!(req.email, "a@example.com");
        assert_eq!(req.password, "pw");
    }

    #[test]
    fn user_response_from_authenticated_user() {
        let user = AuthenticatedUser::new(
            UserId::new("5").unwrap(),
            "ash",
            "ash@example.com",
            vec!["admin".into()],
        );
        let response = UserResponse::from(user);
        assert_eq!(response.id, "5");
        assert_eq!(response.roles, vec!["admin".to_string()]);
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse::bad_request("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "BAD_REQUEST", "message": "nope"}));
    }
}
