//! Handlers for inbound client events.
//!
//! Every handler starts with an explicit capability guard. A refused or
//! malformed request produces one `error` event delivered only to the
//! requester; nothing else observes it.
//!
//! | Event           | Requires | Effect                                   |
//! |-----------------|----------|------------------------------------------|
//! | `join_forum`    | member   | join `forum`                             |
//! | `join_post`     | member   | join `post_{id}`                         |
//! | `leave_post`    | member   | leave `post_{id}`                        |
//! | `roll_dice`     | member   | result to requester, copy to shared room |
//! | `join_admin`    | admin    | join `admin`                             |
//! | `join_editor`   | admin    | join `editor_{id}`                       |
//! | `editor_update` | admin    | relay to `editor_{id}` minus sender      |

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::dice::{DiceEngine, RandomSource, RngSource};
use crate::domain::foundation::{ConnectionId, RoomName, ValidationError};
use crate::domain::identity::{Capability, SessionIdentity};

use super::messages::{
    ClientEvent, DiceResultMessage, DiceType, EditorChangeMessage, EditorUpdate, EntityId,
    JoinedEditorMessage, ServerEvent,
};
use super::rooms::RoomRegistry;
use super::sessions::SessionBindings;

/// Why a client request was refused.
///
/// The `Display` text is exactly what the requester sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteractionError {
    #[error("{}", denial_message(.0))]
    CapabilityDenied(Capability),

    #[error("Not a member of room {0}")]
    NotInRoom(RoomName),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Detail stays in the logs; the client only sees the summary.
    #[error("{summary}")]
    Internal { summary: String, detail: String },
}

fn denial_message(capability: &Capability) -> &'static str {
    match capability {
        Capability::Member => "Authentication required",
        Capability::Admin => "Admin access required",
    }
}

impl InteractionError {
    fn internal(summary: &str, detail: impl ToString) -> Self {
        InteractionError::Internal {
            summary: summary.to_string(),
            detail: detail.to_string(),
        }
    }
}

type SharedSource = Mutex<Box<dyn RandomSource + Send>>;

/// Dispatches client events against the room registry.
pub struct InteractionHandler {
    registry: Arc<RoomRegistry>,
    sessions: Arc<SessionBindings>,
    dice: DiceEngine,
    source: SharedSource,
}

impl InteractionHandler {
    pub fn new(registry: Arc<RoomRegistry>, sessions: Arc<SessionBindings>) -> Self {
        Self::with_dice(
            registry,
            sessions,
            DiceEngine::default(),
            Box::new(RngSource::from_entropy()),
        )
    }

    /// Builds a handler with a specific engine and randomness source.
    pub fn with_dice(
        registry: Arc<RoomRegistry>,
        sessions: Arc<SessionBindings>,
        dice: DiceEngine,
        source: Box<dyn RandomSource + Send>,
    ) -> Self {
        Self {
            registry,
            sessions,
            dice,
            source: Mutex::new(source),
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn sessions(&self) -> &Arc<SessionBindings> {
        &self.sessions
    }

    /// Parses a text frame and handles it, reporting any failure to the
    /// requester as an `error` event.
    pub async fn handle_text(&self, connection_id: ConnectionId, text: &str) {
        let result = match ClientEvent::parse(text) {
            Ok(event) => self.handle(connection_id, event).await,
            Err(e) => Err(e.into()),
        };
        if let Err(error) = result {
            self.reject(connection_id, &error).await;
        }
    }

    /// Handles a validated event.
    pub async fn handle(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), InteractionError> {
        tracing::trace!(connection_id = %connection_id, event = event.name(), "client event");

        match event {
            ClientEvent::JoinForum => self.join_forum(connection_id).await,
            ClientEvent::JoinPost { post_id } => self.join_post(connection_id, &post_id).await,
            ClientEvent::LeavePost { post_id } => self.leave_post(connection_id, &post_id).await,
            ClientEvent::RollDice { dice_type, room } => {
                self.roll_dice(connection_id, dice_type, room).await
            }
            ClientEvent::JoinAdmin => self.join_admin(connection_id).await,
            ClientEvent::JoinEditor { section_id } => {
                self.join_editor(connection_id, &section_id).await
            }
            ClientEvent::EditorUpdate(update) => self.editor_update(connection_id, update).await,
        }
    }

    /// Sends the failure to the requester only.
    pub async fn reject(&self, connection_id: ConnectionId, error: &InteractionError) {
        match error {
            InteractionError::Internal { detail, .. } => {
                tracing::error!(connection_id = %connection_id, detail = %detail, "interaction failed");
            }
            other => {
                tracing::debug!(connection_id = %connection_id, reason = %other, "request refused");
            }
        }
        self.reply(connection_id, ServerEvent::error(error.to_string()))
            .await;
    }

    // ============================================
    // Handlers
    // ============================================

    async fn join_forum(&self, connection_id: ConnectionId) -> Result<(), InteractionError> {
        self.require(connection_id, Capability::Member).await?;
        self.join_and_ack(connection_id, RoomName::forum()).await
    }

    async fn join_post(
        &self,
        connection_id: ConnectionId,
        post_id: &EntityId,
    ) -> Result<(), InteractionError> {
        self.require(connection_id, Capability::Member).await?;
        self.join_and_ack(connection_id, RoomName::post(&post_id.to_string()))
            .await
    }

    async fn leave_post(
        &self,
        connection_id: ConnectionId,
        post_id: &EntityId,
    ) -> Result<(), InteractionError> {
        self.require(connection_id, Capability::Member).await?;
        let room = RoomName::post(&post_id.to_string());
        self.registry.leave(connection_id, &room).await;
        self.reply(connection_id, ServerEvent::left_room(&room)).await;
        Ok(())
    }

    async fn roll_dice(
        &self,
        connection_id: ConnectionId,
        dice_type: DiceType,
        room: Option<RoomName>,
    ) -> Result<(), InteractionError> {
        let identity = self.require(connection_id, Capability::Member).await?;

        if let Some(room) = &room {
            if !self.registry.is_member(connection_id, room).await {
                return Err(InteractionError::NotInRoom(room.clone()));
            }
        }

        let roll = match dice_type {
            DiceType::Double10 => {
                let mut source = self.source.lock().await;
                self.dice
                    .resolve(&mut **source)
                    .map_err(|e| InteractionError::internal("Dice roll failed", e))?
            }
        };

        let result = DiceResultMessage::new(roll, identity.display_name());
        tracing::debug!(
            connection_id = %connection_id,
            total = result.total,
            pairs = result.rolls.len(),
            "dice rolled"
        );

        self.reply(connection_id, ServerEvent::DiceResult(result.clone()))
            .await;
        if let Some(room) = room {
            self.registry
                .broadcast(&room, ServerEvent::SharedDiceRoll(result), Some(connection_id))
                .await;
        }
        Ok(())
    }

    async fn join_admin(&self, connection_id: ConnectionId) -> Result<(), InteractionError> {
        self.require(connection_id, Capability::Admin).await?;
        self.join_and_ack(connection_id, RoomName::admin()).await
    }

    async fn join_editor(
        &self,
        connection_id: ConnectionId,
        section_id: &EntityId,
    ) -> Result<(), InteractionError> {
        self.require(connection_id, Capability::Admin).await?;
        let room = RoomName::editor(&section_id.to_string());
        self.join(connection_id, &room).await?;
        self.reply(
            connection_id,
            ServerEvent::JoinedEditor(JoinedEditorMessage {
                room,
                section_id: section_id.clone(),
            }),
        )
        .await;
        Ok(())
    }

    async fn editor_update(
        &self,
        connection_id: ConnectionId,
        update: EditorUpdate,
    ) -> Result<(), InteractionError> {
        let identity = self.require(connection_id, Capability::Admin).await?;
        let room = RoomName::editor(&update.section_id.to_string());
        let change = ServerEvent::EditorChange(EditorChangeMessage {
            content: update.content,
            cursor_position: update.cursor_position,
            user: identity.display_name().to_string(),
            timestamp: update.timestamp,
        });
        self.registry
            .broadcast(&room, change, Some(connection_id))
            .await;
        Ok(())
    }

    // ============================================
    // Helpers
    // ============================================

    /// Capability guard; returns the identity for handlers that need it.
    async fn require(
        &self,
        connection_id: ConnectionId,
        capability: Capability,
    ) -> Result<SessionIdentity, InteractionError> {
        if !self
            .sessions
            .require_capability(connection_id, capability)
            .await
        {
            return Err(InteractionError::CapabilityDenied(capability));
        }
        Ok(self.sessions.current_identity(connection_id).await)
    }

    async fn join(&self, connection_id: ConnectionId, room: &RoomName) -> Result<(), InteractionError> {
        self.registry
            .join(connection_id, room)
            .await
            .map(|_| ())
            .map_err(|e| InteractionError::internal("Could not join room", e))
    }

    async fn join_and_ack(
        &self,
        connection_id: ConnectionId,
        room: RoomName,
    ) -> Result<(), InteractionError> {
        self.join(connection_id, &room).await?;
        self.reply(connection_id, ServerEvent::joined_room(&room))
            .await;
        Ok(())
    }

    async fn reply(&self, connection_id: ConnectionId, event: ServerEvent) {
        if let Err(e) = self.registry.send_to(connection_id, event).await {
            tracing::debug!(connection_id = %connection_id, error = %e, "reply not delivered");
        }
    }
}
