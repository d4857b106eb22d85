//! Integration tests for the login flow and account moderation endpoints.
//!
//! Wires the real adapters together: in-memory accounts, peppered HMAC
//! digests, signed session tokens and the axum router with auth middleware.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::{middleware, Router};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use lotusrpg_realtime::adapters::accounts::InMemoryAccountRepository;
use lotusrpg_realtime::adapters::auth::{JwtConfig, JwtSessionService};
use lotusrpg_realtime::adapters::credentials::HmacPasswordVerifier;
use lotusrpg_realtime::adapters::http::account::{account_routes, AccountHandlers};
use lotusrpg_realtime::adapters::http::middleware::auth_middleware;
use lotusrpg_realtime::adapters::websocket::{
    open_connection, InteractionHandler, OutboundReceiver, RealtimeNotifier, RoomRegistry,
    SessionBindings,
};
use lotusrpg_realtime::application::handlers::account::{LoginCommand, LoginError, LoginHandler};
use lotusrpg_realtime::domain::account::{Account, LockoutPolicy};
use lotusrpg_realtime::domain::foundation::{ConnectionId, Timestamp, UserId, ADMIN_ROLE};
use lotusrpg_realtime::domain::identity::SessionIdentity;
use lotusrpg_realtime::ports::{AccountRepository, SessionValidator};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Fixture {
    accounts: InMemoryAccountRepository,
    tokens: Arc<JwtSessionService>,
    login: Arc<LoginHandler>,
    registry: Arc<RoomRegistry>,
}

async fn fixture() -> Fixture {
    let verifier = HmacPasswordVerifier::new(SecretString::new("pepper".into()));
    let accounts = InMemoryAccountRepository::new()
        .with_accounts([
            Account::new(UserId::new("1").unwrap(), "ash", "ash@example.com", verifier.hash("correct horse")),
            Account::new(UserId::new("2").unwrap(), "gm", "gm@example.com", verifier.hash("dungeon"))
                .with_roles([ADMIN_ROLE]),
        ])
        .await;
    let tokens = Arc::new(JwtSessionService::new(JwtConfig::new(
        SecretString::new("integration-secret-integration-secret".into()),
        "lotusrpg",
        60,
    )));
    let login = Arc::new(LoginHandler::new(
        Arc::new(accounts.clone()),
        Arc::new(verifier),
        tokens.clone(),
        LockoutPolicy::default(),
    ));

    Fixture {
        accounts,
        tokens,
        login,
        registry: Arc::new(RoomRegistry::new()),
    }
}

fn router(fixture: &Fixture) -> Router {
    let validator: Arc<dyn SessionValidator> = fixture.tokens.clone();
    let handlers = AccountHandlers::new(
        Arc::clone(&fixture.login),
        RealtimeNotifier::new(Arc::clone(&fixture.registry)),
    );
    Router::new().nest(
        "/api",
        account_routes(handlers).layer(middleware::from_fn_with_state(validator, auth_middleware)),
    )
}

fn cmd(email: &str, password: &str) -> LoginCommand {
    LoginCommand {
        email: email.into(),
        password: password.into(),
    }
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "email": email, "password": password }).to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Login handler with real adapters
// =============================================================================

#[tokio::test]
async fn issued_token_validates_back_to_the_user() {
    let fixture = fixture().await;

    let result = fixture
        .login
        .handle(cmd("ASH@example.com", "correct horse"), Timestamp::now())
        .await
        .unwrap();

    let user = fixture.tokens.validate(&result.token).await.unwrap();
    assert_eq!(user.id.as_str(), "1");
    assert_eq!(user.username, "ash");
}

#[tokio::test]
async fn five_failures_lock_then_window_expires() {
    let fixture = fixture().await;
    let start = Timestamp::now();

    for _ in 0..5 {
        let result = fixture.login.handle(cmd("ash@example.com", "wrong"), start).await;
        assert!(matches!(result, Err(LoginError::InvalidCredentials)));
    }

    let locked = fixture
        .login
        .handle(cmd("ash@example.com", "correct horse"), start.plus_minutes(29))
        .await;
    assert!(matches!(locked, Err(LoginError::AccountLocked { .. })));

    let reopened = fixture
        .login
        .handle(cmd("ash@example.com", "correct horse"), start.plus_minutes(30))
        .await;
    assert!(reopened.is_ok());

    let security = fixture.accounts.load_security(&UserId::new("1").unwrap()).await.unwrap();
    assert_eq!(security.failed_attempts(), 0);
    assert_eq!(security.lockout_until(), None);
}

// =============================================================================
// HTTP surface
// =============================================================================

#[tokio::test]
async fn login_endpoint_returns_token_and_user() {
    let fixture = fixture().await;

    let response = router(&fixture)
        .oneshot(login_request("ash@example.com", "correct horse"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "ash");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn login_endpoint_reports_lockout_as_423() {
    let fixture = fixture().await;
    let app = router(&fixture);

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(login_request("ash@example.com", "wrong"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app
        .oneshot(login_request("ash@example.com", "correct horse"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::LOCKED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "ACCOUNT_LOCKED");
    assert!(body["details"]["locked_until"].is_string());
}

#[tokio::test]
async fn admin_unlock_clears_lockout_and_notifies_admin_room() {
    let fixture = fixture().await;
    let app = router(&fixture);

    for _ in 0..5 {
        let _ = fixture.login.handle(cmd("ash@example.com", "wrong"), Timestamp::now()).await;
    }

    // An admin is listening in the admin room
    let listener = InteractionHandler::new(Arc::clone(&fixture.registry), Arc::new(SessionBindings::new()));
    let gm = fixture.login.handle(cmd("gm@example.com", "dungeon"), Timestamp::now()).await.unwrap();
    let conn = ConnectionId::new();
    let mut rx: OutboundReceiver =
        open_connection(&listener, conn, SessionIdentity::from_user(&gm.user), 16).await;
    listener.handle_text(conn, r#"{"event":"join_admin"}"#).await;
    while rx.try_recv().is_ok() {}

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/users/1/unlock")
                .header("authorization", format!("Bearer {}", gm.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(fixture
        .login
        .handle(cmd("ash@example.com", "correct horse"), Timestamp::now())
        .await
        .is_ok());

    let event = serde_json::to_value(&*rx.try_recv().unwrap()).unwrap();
    assert_eq!(event["event"], "admin_notification");
    assert_eq!(event["data"]["action"], "unlock");
    assert_eq!(event["data"]["target"], "ash");
    assert_eq!(event["data"]["admin"], "gm");
}

#[tokio::test]
async fn unlock_requires_admin_token() {
    let fixture = fixture().await;
    let member = fixture
        .login
        .handle(cmd("ash@example.com", "correct horse"), Timestamp::now())
        .await
        .unwrap();

    let unlock = |auth: Option<String>| {
        let mut builder = Request::builder().method("POST").uri("/api/admin/users/1/unlock");
        if let Some(token) = auth {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    };

    let anonymous = router(&fixture).oneshot(unlock(None)).await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let as_member = router(&fixture).oneshot(unlock(Some(member.token))).await.unwrap();
    assert_eq!(as_member.status(), StatusCode::FORBIDDEN);

    let garbage = router(&fixture).oneshot(unlock(Some("garbage".into()))).await.unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}
