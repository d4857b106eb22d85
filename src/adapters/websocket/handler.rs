//! WebSocket upgrade handler for real-time forum connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Resolve the session token (if any) to an identity
//! 2. Upgrade to WebSocket
//! 3. Register the connection and bind its identity
//! 4. Send `connected`, then pump frames both ways until disconnect
//! 5. Drop room memberships and unbind, exactly once

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::domain::foundation::{ConnectionId, ValidationError};
use crate::domain::identity::SessionIdentity;
use crate::ports::SessionValidator;

use super::{
    interactions::{InteractionError, InteractionHandler},
    messages::{ConnectedMessage, ServerEvent, UserSummary},
    rooms::{OutboundReceiver, DEFAULT_OUTBOUND_CAPACITY},
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub interactions: Arc<InteractionHandler>,
    pub validator: Arc<dyn SessionValidator>,
    /// Per-connection outbound queue size.
    pub outbound_capacity: usize,
}

impl WebSocketState {
    pub fn new(interactions: Arc<InteractionHandler>, validator: Arc<dyn SessionValidator>) -> Self {
        Self {
            interactions,
            validator,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }
}

/// Query string accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws`
///
/// The session token is read from `Authorization: Bearer <token>` or the
/// `token` query parameter. A missing or invalid token connects as guest.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let token = bearer_token(&headers).or(params.token);
    let identity = resolve_identity(state.validator.as_ref(), token.as_deref()).await;

    ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
}

/// Resolves a token to an identity. Never fails; anything wrong is a guest.
pub async fn resolve_identity(validator: &dyn SessionValidator, token: Option<&str>) -> SessionIdentity {
    let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
        return SessionIdentity::Guest;
    };

    match validator.validate(token).await {
        Ok(user) => SessionIdentity::from_user(&user),
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected, connecting as guest");
            SessionIdentity::Guest
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Registers a connection and queues its `connected` event.
///
/// Returns the receiving half of the connection's outbound queue.
pub async fn open_connection(
    interactions: &InteractionHandler,
    connection_id: ConnectionId,
    identity: SessionIdentity,
    capacity: usize,
) -> OutboundReceiver {
    let rx = interactions.registry().connect(connection_id, capacity).await;
    let connected = connected_event(&identity);
    interactions.sessions().bind(connection_id, identity).await;

    if let Err(e) = interactions.registry().send_to(connection_id, connected).await {
        tracing::debug!(connection_id = %connection_id, error = %e, "connected event not queued");
    }
    rx
}

/// Removes every trace of a connection.
pub async fn close_connection(interactions: &InteractionHandler, connection_id: ConnectionId) {
    let rooms = interactions.registry().drop_connection(connection_id).await;
    interactions.sessions().unbind(connection_id).await;
    tracing::debug!(connection_id = %connection_id, rooms = rooms.len(), "connection closed");
}

fn connected_event(identity: &SessionIdentity) -> ServerEvent {
    let message = match identity.identity() {
        Some(identity) => ConnectedMessage {
            message: "Connected successfully".to_string(),
            user: Some(UserSummary {
                id: identity.user_id().to_string(),
                username: identity.display_name().to_string(),
            }),
        },
        None => ConnectedMessage {
            message: "Connected as guest".to_string(),
            user: None,
        },
    };
    ServerEvent::Connected(message)
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection:
/// - Forwarding the outbound queue to the client
/// - Dispatching client frames to the interaction handlers
/// - Cleanup on disconnect
async fn handle_socket(socket: WebSocket, identity: SessionIdentity, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = ConnectionId::new();
    let guest = identity.is_guest();

    let mut outbound = open_connection(
        &state.interactions,
        connection_id,
        identity,
        state.outbound_capacity,
    )
    .await;
    tracing::info!(connection_id = %connection_id, guest, "client connected");

    // Forward queued events to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            if let Err(e) = send_event(&mut sender, &event).await {
                tracing::debug!(connection_id = %connection_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    // Handle incoming frames from the client
    let interactions = Arc::clone(&state.interactions);
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    interactions.handle_text(connection_id, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(connection_id = %connection_id, "Received unsupported binary message");
                    let error = InteractionError::from(ValidationError::invalid_format(
                        "message",
                        "binary frames are not supported",
                    ));
                    interactions.reject(connection_id, &error).await;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level keepalive, answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    close_connection(&state.interactions, connection_id).await;
    tracing::info!(connection_id = %connection_id, "client disconnected");
}

/// Send a JSON event over the WebSocket.
async fn send_event(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new().merge(websocket_router(ws_state));
/// ```
pub fn websocket_router(state: WebSocketState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
