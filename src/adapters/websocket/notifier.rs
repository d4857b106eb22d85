//! Server-originated notifications.
//!
//! Forum and moderation code outside the socket loop publishes through
//! [`RealtimeNotifier`]; each call maps to one room:
//!
//! ```text
//! new_post           → forum
//! new_comment        → post_{post_id}
//! post_updated       → post_{id}
//! comment_updated    → post_{post_id}
//! admin_notification → admin
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::foundation::{RoomName, ValidationError};
use crate::domain::identity::{Capability, SessionIdentity};

use super::messages::{EntityId, ServerEvent};
use super::rooms::{BroadcastReport, RoomRegistry};

/// Moderation actions announced to the admin room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionKind {
    Ban,
    Unban,
    Unlock,
    UserDeleted,
    RolesUpdated,
}

impl fmt::Display for AdminActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdminActionKind::Ban => "ban",
            AdminActionKind::Unban => "unban",
            AdminActionKind::Unlock => "unlock",
            AdminActionKind::UserDeleted => "user_deleted",
            AdminActionKind::RolesUpdated => "roles_updated",
        };
        write!(f, "{}", name)
    }
}

/// One moderation action and its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAction {
    pub kind: AdminActionKind,
    /// Username of the affected account.
    pub target: String,
    /// Only set for `roles_updated`.
    pub new_roles: Option<Vec<String>>,
}

impl AdminAction {
    pub fn new(kind: AdminActionKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            new_roles: None,
        }
    }

    pub fn roles_updated(target: impl Into<String>, new_roles: Vec<String>) -> Self {
        Self {
            kind: AdminActionKind::RolesUpdated,
            target: target.into(),
            new_roles: Some(new_roles),
        }
    }

    fn to_payload(&self, admin: &str) -> Value {
        let mut payload = json!({
            "action": self.kind,
            "target": self.target,
            "admin": admin,
        });
        if let (Some(roles), Some(map)) = (&self.new_roles, payload.as_object_mut()) {
            map.insert("new_roles".to_string(), json!(roles));
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    #[error("Admin access required")]
    AdminRequired,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Publishes forum and moderation events into rooms.
#[derive(Clone)]
pub struct RealtimeNotifier {
    registry: Arc<RoomRegistry>,
}

impl RealtimeNotifier {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Announces a new post to the forum room.
    pub async fn notify_new_post(&self, post: Value) -> BroadcastReport {
        self.registry
            .broadcast(&RoomName::forum(), ServerEvent::NewPost(post), None)
            .await
    }

    /// Announces a new comment to the post's room.
    pub async fn notify_new_comment(&self, post_id: &EntityId, comment: Value) -> BroadcastReport {
        self.registry
            .broadcast(
                &RoomName::post(&post_id.to_string()),
                ServerEvent::NewComment(comment),
                None,
            )
            .await
    }

    /// Announces an edited post; the room comes from the payload's `id`.
    pub async fn notify_post_update(&self, post: Value) -> Result<BroadcastReport, NotifyError> {
        let id = post
            .get("id")
            .cloned()
            .ok_or_else(|| ValidationError::missing_field("id"))
            .and_then(|id| {
                serde_json::from_value::<EntityId>(id)
                    .map_err(|e| ValidationError::invalid_format("id", e.to_string()))
            })?;

        Ok(self
            .registry
            .broadcast(
                &RoomName::post(&id.to_string()),
                ServerEvent::PostUpdated(post),
                None,
            )
            .await)
    }

    /// Announces an edited comment to the post's room.
    pub async fn notify_comment_update(&self, post_id: &EntityId, comment: Value) -> BroadcastReport {
        self.registry
            .broadcast(
                &RoomName::post(&post_id.to_string()),
                ServerEvent::CommentUpdated(comment),
                None,
            )
            .await
    }

    /// Announces a moderation action to the admin room.
    ///
    /// Only admins may publish here.
    pub async fn notify_admin_action(
        &self,
        actor: &SessionIdentity,
        action: &AdminAction,
    ) -> Result<BroadcastReport, NotifyError> {
        if !actor.has_capability(Capability::Admin) {
            tracing::debug!(action = %action.kind, "admin notification refused");
            return Err(NotifyError::AdminRequired);
        }

        tracing::info!(
            action = %action.kind,
            target = %action.target,
            admin = actor.display_name(),
            "admin action"
        );
        let payload = action.to_payload(actor.display_name());
        Ok(self
            .registry
            .broadcast(&RoomName::admin(), ServerEvent::AdminNotification(payload), None)
            .await)
    }
}
