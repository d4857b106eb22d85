//! Room registry and broadcaster for real-time connections.
//!
//! Rooms are named groups of connections. A connection can sit in any
//! number of rooms; a broadcast fans an event out to every member of one
//! room, optionally skipping the sender.
//!
//! # Architecture
//!
//! ```text
//! Room: forum        Room: post_12      Room: admin
//! ├── conn-a         ├── conn-a         └── conn-c
//! ├── conn-b         └── conn-c
//! └── conn-c
//! ```
//!
//! Each connection owns a bounded outbound queue drained by its socket
//! task. Broadcasts only enqueue, so a slow or dead socket never stalls
//! the others.
//!
//! # Authorization
//!
//! The registry performs no capability checks. Callers joining a
//! connection to a privileged room (`admin`, `editor_*`) must have checked
//! the connection's capabilities first; the interaction handlers always do.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::domain::foundation::{ConnectionId, RoomName};

use super::messages::ServerEvent;

/// Outbound queue for one connection.
pub type OutboundSender = mpsc::Sender<Arc<ServerEvent>>;
/// Receiving half drained by the socket task.
pub type OutboundReceiver = mpsc::Receiver<Arc<ServerEvent>>;

/// Default per-connection queue capacity.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 128;

/// Why a single delivery did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("Outbound queue for {0} is full")]
    ChannelFull(ConnectionId),

    #[error("Connection {0} has gone away")]
    Disconnected(ConnectionId),
}

/// Counts from one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

struct ConnectionEntry {
    sender: OutboundSender,
    rooms: HashSet<RoomName>,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    rooms: HashMap<RoomName, HashSet<ConnectionId>>,
}

/// Tracks room membership and fans events out to members.
///
/// # Thread Safety
///
/// All membership changes and broadcasts run under one mutex, so they are
/// linearized: two broadcasts to the same room reach every stable member
/// in the order they were issued, and a dropped connection never sees a
/// broadcast issued after the drop.
///
/// Empty rooms are removed as soon as their last member leaves.
pub struct RoomRegistry {
    state: Mutex<RegistryState>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Creates an outbound queue and registers the connection with it.
    pub async fn connect(&self, connection_id: ConnectionId, capacity: usize) -> OutboundReceiver {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        self.register(connection_id, tx).await;
        rx
    }

    /// Registers a connection with an existing outbound queue.
    ///
    /// Re-registering replaces the queue and keeps room memberships.
    pub async fn register(&self, connection_id: ConnectionId, sender: OutboundSender) {
        let mut state = self.state.lock().await;
        state
            .connections
            .entry(connection_id)
            .and_modify(|entry| entry.sender = sender.clone())
            .or_insert_with(|| ConnectionEntry {
                sender,
                rooms: HashSet::new(),
            });
    }

    /// Adds a connection to a room, creating the room on first join.
    ///
    /// Idempotent; returns `true` if the connection was not yet a member.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room: &RoomName,
    ) -> Result<bool, DeliveryError> {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let entry = state
            .connections
            .get_mut(&connection_id)
            .ok_or(DeliveryError::UnknownConnection(connection_id))?;

        let added = entry.rooms.insert(room.clone());
        state
            .rooms
            .entry(room.clone())
            .or_default()
            .insert(connection_id);

        if added {
            tracing::debug!(connection_id = %connection_id, room = %room, "joined room");
        }
        Ok(added)
    }

    /// Removes a connection from a room.
    ///
    /// Idempotent; returns `true` if the connection was a member.
    pub async fn leave(&self, connection_id: ConnectionId, room: &RoomName) -> bool {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let removed = state
            .connections
            .get_mut(&connection_id)
            .map(|entry| entry.rooms.remove(room))
            .unwrap_or(false);

        remove_member(&mut state.rooms, room, connection_id);

        if removed {
            tracing::debug!(connection_id = %connection_id, room = %room, "left room");
        }
        removed
    }

    /// Forgets a connection and removes it from every room it occupied.
    ///
    /// Called once, at disconnect. Returns the rooms it was removed from.
    pub async fn drop_connection(&self, connection_id: ConnectionId) -> Vec<RoomName> {
        let mut state = self.state.lock().await;
        let state = &mut *state;

        let Some(entry) = state.connections.remove(&connection_id) else {
            return Vec::new();
        };

        let mut rooms: Vec<RoomName> = entry.rooms.into_iter().collect();
        rooms.sort();
        for room in &rooms {
            remove_member(&mut state.rooms, room, connection_id);
        }

        tracing::debug!(connection_id = %connection_id, rooms = rooms.len(), "connection dropped");
        rooms
    }

    /// Sends an event to every member of `room` except `exclude`.
    ///
    /// Best effort: a full or closed queue is logged and skipped, and never
    /// reported to the caller as an error.
    pub async fn broadcast(
        &self,
        room: &RoomName,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> BroadcastReport {
        let event = Arc::new(event);
        let state = self.state.lock().await;
        let mut report = BroadcastReport::default();

        let Some(members) = state.rooms.get(room) else {
            return report;
        };

        for member in members.iter().filter(|m| Some(**m) != exclude) {
            let result = match state.connections.get(member) {
                Some(entry) => try_deliver(*member, &entry.sender, Arc::clone(&event)),
                None => Err(DeliveryError::UnknownConnection(*member)),
            };
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    log_delivery_failure(&e, room, event.name());
                }
            }
        }

        tracing::debug!(
            room = %room,
            event = event.name(),
            delivered = report.delivered,
            failed = report.failed,
            "broadcast"
        );
        report
    }

    /// Sends an event to a single connection.
    pub async fn send_to(
        &self,
        connection_id: ConnectionId,
        event: ServerEvent,
    ) -> Result<(), DeliveryError> {
        let state = self.state.lock().await;
        let entry = state
            .connections
            .get(&connection_id)
            .ok_or(DeliveryError::UnknownConnection(connection_id))?;
        try_deliver(connection_id, &entry.sender, Arc::new(event))
    }

    /// Returns true if the connection is currently in the room.
    pub async fn is_member(&self, connection_id: ConnectionId, room: &RoomName) -> bool {
        let state = self.state.lock().await;
        state
            .connections
            .get(&connection_id)
            .map(|entry| entry.rooms.contains(room))
            .unwrap_or(false)
    }

    /// Current members of a room (empty if the room does not exist).
    pub async fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        let mut members: Vec<ConnectionId> = state
            .rooms
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    /// Rooms the connection is in, sorted by name.
    pub async fn rooms_of(&self, connection_id: ConnectionId) -> Vec<RoomName> {
        let state = self.state.lock().await;
        let mut rooms: Vec<RoomName> = state
            .connections
            .get(&connection_id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    /// Names of rooms with at least one member.
    pub async fn active_rooms(&self) -> Vec<RoomName> {
        let state = self.state.lock().await;
        let mut rooms: Vec<RoomName> = state.rooms.keys().cloned().collect();
        rooms.sort();
        rooms
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_member(
    rooms: &mut HashMap<RoomName, HashSet<ConnectionId>>,
    room: &RoomName,
    connection_id: ConnectionId,
) {
    if let Some(members) = rooms.get_mut(room) {
        members.remove(&connection_id);
        if members.is_empty() {
            rooms.remove(room);
        }
    }
}

fn try_deliver(
    connection_id: ConnectionId,
    sender: &OutboundSender,
    event: Arc<ServerEvent>,
) -> Result<(), DeliveryError> {
    sender.try_send(event).map_err(|e| match e {
        mpsc::error::TrySendError::Full(_) => DeliveryError::ChannelFull(connection_id),
        mpsc::error::TrySendError::Closed(_) => DeliveryError::Disconnected(connection_id),
    })
}

fn log_delivery_failure(error: &DeliveryError, room: &RoomName, event: &str) {
    match error {
        DeliveryError::ChannelFull(id) => {
            tracing::warn!(connection_id = %id, room = %room, event, "outbound queue full, event dropped");
        }
        DeliveryError::Disconnected(id) | DeliveryError::UnknownConnection(id) => {
            tracing::debug!(connection_id = %id, room = %room, event, "recipient gone, event dropped");
        }
    }
}
