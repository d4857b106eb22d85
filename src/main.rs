//! LotusRPG realtime server binary.

use std::sync::Arc;

use axum::{middleware, Router};
use secrecy::ExposeSecret;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use lotusrpg_realtime::adapters::accounts::InMemoryAccountRepository;
use lotusrpg_realtime::adapters::auth::JwtSessionService;
use lotusrpg_realtime::adapters::credentials::HmacPasswordVerifier;
use lotusrpg_realtime::adapters::http::account::{account_routes, AccountHandlers};
use lotusrpg_realtime::adapters::http::health::health_router;
use lotusrpg_realtime::adapters::http::middleware::auth_middleware;
use lotusrpg_realtime::adapters::websocket::{
    websocket_router, InteractionHandler, RealtimeNotifier, RoomRegistry, SessionBindings,
    WebSocketState,
};
use lotusrpg_realtime::application::handlers::account::LoginHandler;
use lotusrpg_realtime::config::{AppConfig, AuthConfig, LogFormat, ServerConfig};
use lotusrpg_realtime::domain::account::Account;
use lotusrpg_realtime::domain::dice::{DiceEngine, RngSource};
use lotusrpg_realtime::domain::foundation::{UserId, ADMIN_ROLE};
use lotusrpg_realtime::ports::SessionValidator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        port = config.server.port,
        "starting LotusRPG realtime server"
    );

    // Real-time layer
    let registry = Arc::new(RoomRegistry::new());
    let sessions = Arc::new(SessionBindings::new());
    let interactions = Arc::new(InteractionHandler::with_dice(
        Arc::clone(&registry),
        sessions,
        DiceEngine::new(config.realtime.dice_draw_cap),
        Box::new(RngSource::from_entropy()),
    ));
    let notifier = RealtimeNotifier::new(Arc::clone(&registry));

    // Auth and login
    let tokens = Arc::new(JwtSessionService::new(config.auth.jwt_config()));
    let validator: Arc<dyn SessionValidator> = tokens.clone();
    let verifier = Arc::new(HmacPasswordVerifier::new(config.auth.password_pepper.clone()));
    let accounts = Arc::new(InMemoryAccountRepository::new());
    seed_bootstrap_admin(&config.auth, &verifier, &accounts).await?;
    let login_handler = Arc::new(LoginHandler::new(
        accounts,
        verifier,
        tokens,
        config.lockout.policy(),
    ));

    let ws_state = WebSocketState::new(interactions, Arc::clone(&validator))
        .with_outbound_capacity(config.realtime.outbound_capacity);

    let api = account_routes(AccountHandlers::new(login_handler, notifier))
        .layer(middleware::from_fn_with_state(validator, auth_middleware));

    let app = Router::new()
        .merge(websocket_router(ws_state))
        .merge(health_router(registry))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.server.cors_origins()?));

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn seed_bootstrap_admin(
    auth: &AuthConfig,
    verifier: &HmacPasswordVerifier,
    accounts: &InMemoryAccountRepository,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(email), Some(password)) = (&auth.bootstrap_admin_email, &auth.bootstrap_admin_password)
    else {
        tracing::warn!("no bootstrap admin configured, account store is empty");
        return Ok(());
    };

    let username = email.split('@').next().unwrap_or(email.as_str());
    let account = Account::new(
        UserId::new("1")?,
        username,
        email.clone(),
        verifier.hash(password.expose_secret()),
    )
    .with_roles([ADMIN_ROLE]);
    accounts.insert(account).await;

    tracing::info!(email = %email, "bootstrap admin seeded");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.effective_log_format() {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn cors_layer(origins: Vec<http::HeaderValue>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
