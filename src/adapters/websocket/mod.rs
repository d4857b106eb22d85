//! WebSocket adapters for real-time forum updates.
//!
//! This module provides the infrastructure for pushing forum activity,
//! dice rolls and collaborative edits to connected clients.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  ws_handler (GET /ws)                                │
//! │   - Resolves the session token to an identity (or guest)            │
//! │   - Registers the connection and binds its identity                 │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ client frames
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    InteractionHandler                                │
//! │   - Capability guard on every request                               │
//! │   - Joins/leaves rooms, rolls dice, relays editor changes           │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ broadcasts
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RoomRegistry                                    │
//! │   Room: forum          Room: post_12        Room: admin             │
//! │   ├── conn-a           ├── conn-a           └── conn-c              │
//! │   ├── conn-b           └── conn-c                                    │
//! │   └── conn-c                                                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `RealtimeNotifier` publishes server-originated events into the same
//! registry.
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`rooms`] - Room membership and broadcast
//! - [`sessions`] - Connection → identity binding
//! - [`interactions`] - Client event handlers
//! - [`notifier`] - Server-originated notifications
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod interactions;
pub mod messages;
pub mod notifier;
pub mod rooms;
pub mod sessions;

pub use handler::{close_connection, open_connection, websocket_router, ws_handler, WebSocketState};
pub use interactions::{InteractionError, InteractionHandler};
pub use messages::{ClientEvent, DiceType, EntityId, ServerEvent};
pub use notifier::{AdminAction, AdminActionKind, NotifyError, RealtimeNotifier};
pub use rooms::{
    BroadcastReport, DeliveryError, OutboundReceiver, OutboundSender, RoomRegistry,
    DEFAULT_OUTBOUND_CAPACITY,
};
pub use sessions::SessionBindings;
