//! HTTP routes for login and account moderation endpoints.

use axum::{routing::post, Router};

use super::handlers::{login, unlock_account, AccountHandlers};

/// Creates the account router.
///
/// The unlock route expects `auth_middleware` to be layered above it.
pub fn account_routes(handlers: AccountHandlers) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/admin/users/:id/unlock", post(unlock_account))
        .with_state(handlers)
}
