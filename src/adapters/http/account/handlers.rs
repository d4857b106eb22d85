//! HTTP handlers for login and account moderation endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAdmin;
use crate::adapters::websocket::{AdminAction, AdminActionKind, RealtimeNotifier};
use crate::application::handlers::account::{LoginCommand, LoginError, LoginHandler};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::identity::SessionIdentity;

use super::dto::{AccountCommandResponse, ErrorResponse, LoginRequest, LoginResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct AccountHandlers {
    login_handler: Arc<LoginHandler>,
    notifier: RealtimeNotifier,
}

impl AccountHandlers {
    pub fn new(login_handler: Arc<LoginHandler>, notifier: RealtimeNotifier) -> Self {
        Self {
            login_handler,
            notifier,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(handlers): State<AccountHandlers>,
    Json(req): Json<LoginRequest>,
) -> Response {
    let cmd = LoginCommand {
        email: req.email,
        password: req.password,
    };

    match handlers.login_handler.handle(cmd, Timestamp::now()).await {
        Ok(result) => {
            let response = LoginResponse {
                token: result.token,
                user: result.user.into(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_login_error(e),
    }
}

/// POST /api/admin/users/:id/unlock - Lift a lockout early
pub async fn unlock_account(
    State(handlers): State<AccountHandlers>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Response {
    let user_id = match UserId::new(user_id) {
        Ok(id) => id,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_request(e.to_string())))
                .into_response()
        }
    };

    let account = match handlers.login_handler.unlock(&user_id).await {
        Ok(account) => account,
        Err(e) => return handle_login_error(e),
    };

    let actor = SessionIdentity::from_user(&admin);
    let action = AdminAction::new(AdminActionKind::Unlock, account.username.clone());
    if let Err(e) = handlers.notifier.notify_admin_action(&actor, &action).await {
        tracing::warn!(error = %e, "unlock notification not published");
    }

    (StatusCode::OK, Json(AccountCommandResponse::unlocked(&account))).into_response()
}

/// Maps login outcomes to statuses: 401 invalid, 403 banned/inactive,
/// 423 locked.
pub fn login_error_status(error: &LoginError) -> StatusCode {
    match error {
        LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        LoginError::AccountBanned | LoginError::AccountInactive => StatusCode::FORBIDDEN,
        LoginError::AccountLocked { .. } => StatusCode::LOCKED,
        LoginError::AccountNotFound => StatusCode::NOT_FOUND,
        LoginError::Repository(_) | LoginError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn handle_login_error(error: LoginError) -> Response {
    let status = login_error_status(&error);
    let body = match &error {
        LoginError::InvalidCredentials => ErrorResponse::new("INVALID_CREDENTIALS", error.to_string()),
        LoginError::AccountLocked { until } => ErrorResponse::new("ACCOUNT_LOCKED", error.to_string())
            .with_details(serde_json::json!({ "locked_until": until.to_rfc3339() })),
        LoginError::AccountBanned => ErrorResponse::new("ACCOUNT_BANNED", error.to_string()),
        LoginError::AccountInactive => ErrorResponse::new("ACCOUNT_INACTIVE", error.to_string()),
        LoginError::AccountNotFound => ErrorResponse::new("NOT_FOUND", error.to_string()),
        LoginError::Repository(_) | LoginError::Token(_) => {
            tracing::error!(error = %error, "login infrastructure failure");
            ErrorResponse::internal("Login temporarily unavailable")
        }
    };
    (status, Json(body)).into_response()
}
