//! WebSocket message types for the real-time forum layer.
//!
//! Every frame is a JSON envelope `{"event": "<name>", "data": {...}}`:
//! - Server → Client: connection status, room acknowledgements, dice
//!   results, editor changes, forum/admin notifications, errors
//! - Client → Server: room joins/leaves, dice rolls, editor updates

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::dice::{DicePair, DiceRoll};
use crate::domain::foundation::{RoomName, ValidationError};

// ============================================
// Server → Client Messages
// ============================================

/// All events the server pushes to a connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent exactly once, right after the upgrade.
    Connected(ConnectedMessage),

    JoinedRoom(RoomMessage),
    LeftRoom(RoomMessage),
    JoinedEditor(JoinedEditorMessage),

    /// Dice result for the requester.
    DiceResult(DiceResultMessage),
    /// Copy of a dice result for the rest of a shared room.
    SharedDiceRoll(DiceResultMessage),

    EditorChange(EditorChangeMessage),

    /// Moderation feed; payload shape is owned by the admin surface.
    AdminNotification(Value),

    // Forum notifications; payloads are the serialized forum entities.
    NewPost(Value),
    NewComment(Value),
    PostUpdated(Value),
    CommentUpdated(Value),

    Error(ErrorMessage),
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected(_) => "connected",
            ServerEvent::JoinedRoom(_) => "joined_room",
            ServerEvent::LeftRoom(_) => "left_room",
            ServerEvent::JoinedEditor(_) => "joined_editor",
            ServerEvent::DiceResult(_) => "dice_result",
            ServerEvent::SharedDiceRoll(_) => "shared_dice_roll",
            ServerEvent::EditorChange(_) => "editor_change",
            ServerEvent::AdminNotification(_) => "admin_notification",
            ServerEvent::NewPost(_) => "new_post",
            ServerEvent::NewComment(_) => "new_comment",
            ServerEvent::PostUpdated(_) => "post_updated",
            ServerEvent::CommentUpdated(_) => "comment_updated",
            ServerEvent::Error(_) => "error",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error(ErrorMessage {
            message: message.into(),
        })
    }

    pub fn joined_room(room: &RoomName) -> Self {
        ServerEvent::JoinedRoom(RoomMessage { room: room.clone() })
    }

    pub fn left_room(room: &RoomName) -> Self {
        ServerEvent::LeftRoom(RoomMessage { room: room.clone() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomMessage {
    pub room: RoomName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedEditorMessage {
    pub room: RoomName,
    pub section_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiceResultMessage {
    pub total: u32,
    pub rolls: Vec<DicePair>,
    /// Display name of whoever rolled.
    pub user: String,
}

impl DiceResultMessage {
    pub fn new(roll: DiceRoll, user: impl Into<String>) -> Self {
        Self {
            total: roll.total,
            rolls: roll.rolls,
            user: user.into(),
        }
    }
}

/// Editor payload relayed verbatim apart from the sender's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorChangeMessage {
    pub content: Value,
    pub cursor_position: Value,
    pub user: String,
    pub timestamp: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

// ============================================
// Client → Server Messages
// ============================================

/// Raw inbound frame before the payload is validated.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

/// Forum entity id as sent by clients: numeric or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{}", n),
            EntityId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Supported dice mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiceType {
    /// Two d10 with double-ten rerolls.
    #[default]
    Double10,
}

impl DiceType {
    fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw {
            None | Some("double10") => Ok(DiceType::Double10),
            Some(other) => Err(ValidationError::invalid_format(
                "type",
                format!("Unsupported dice type '{}'", other),
            )),
        }
    }
}

/// Editor update as received from an admin.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorUpdate {
    pub section_id: EntityId,
    pub content: Value,
    pub cursor_position: Value,
    pub timestamp: Value,
}

/// Validated client requests.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinForum,
    JoinPost { post_id: EntityId },
    LeavePost { post_id: EntityId },
    RollDice { dice_type: DiceType, room: Option<RoomName> },
    JoinAdmin,
    JoinEditor { section_id: EntityId },
    EditorUpdate(EditorUpdate),
}

#[derive(Debug, Default, Deserialize)]
struct PostPayload {
    post_id: Option<EntityId>,
}

#[derive(Debug, Default, Deserialize)]
struct RollDicePayload {
    #[serde(rename = "type")]
    dice_type: Option<String>,
    room: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SectionPayload {
    section_id: Option<EntityId>,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    cursor_position: Value,
    #[serde(default)]
    timestamp: Value,
}

impl ClientEvent {
    /// Parses and validates a text frame.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let envelope: ClientEnvelope = serde_json::from_str(text)
            .map_err(|e| ValidationError::invalid_format("message", e.to_string()))?;
        Self::from_envelope(envelope)
    }

    /// Validates an already-decoded envelope.
    pub fn from_envelope(envelope: ClientEnvelope) -> Result<Self, ValidationError> {
        let data = match envelope.data {
            Value::Null => Value::Object(Default::default()),
            object @ Value::Object(_) => object,
            _ => {
                return Err(ValidationError::invalid_format(
                    "data",
                    "payload must be a JSON object",
                ))
            }
        };

        match envelope.event.as_str() {
            "join_forum" => Ok(ClientEvent::JoinForum),
            "join_admin" => Ok(ClientEvent::JoinAdmin),
            "join_post" => Ok(ClientEvent::JoinPost {
                post_id: required_id(payload::<PostPayload>(data)?.post_id, "post_id")?,
            }),
            "leave_post" => Ok(ClientEvent::LeavePost {
                post_id: required_id(payload::<PostPayload>(data)?.post_id, "post_id")?,
            }),
            "roll_dice" => {
                let p: RollDicePayload = payload(data)?;
                let room = p.room.map(RoomName::new).transpose()?;
                Ok(ClientEvent::RollDice {
                    dice_type: DiceType::parse(p.dice_type.as_deref())?,
                    room,
                })
            }
            "join_editor" => Ok(ClientEvent::JoinEditor {
                section_id: required_id(payload::<SectionPayload>(data)?.section_id, "section_id")?,
            }),
            "editor_update" => {
                let p: SectionPayload = payload(data)?;
                Ok(ClientEvent::EditorUpdate(EditorUpdate {
                    section_id: required_id(p.section_id, "section_id")?,
                    content: p.content,
                    cursor_position: p.cursor_position,
                    timestamp: p.timestamp,
                }))
            }
            other => Err(ValidationError::invalid_format(
                "event",
                format!("Unknown event '{}'", other),
            )),
        }
    }

    /// Wire name of the request, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinForum => "join_forum",
            ClientEvent::JoinPost { .. } => "join_post",
            ClientEvent::LeavePost { .. } => "leave_post",
            ClientEvent::RollDice { .. } => "roll_dice",
            ClientEvent::JoinAdmin => "join_admin",
            ClientEvent::JoinEditor { .. } => "join_editor",
            ClientEvent::EditorUpdate(_) => "editor_update",
        }
    }
}

fn payload<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, ValidationError> {
    serde_json::from_value(data).map_err(|e| ValidationError::invalid_format("data", e.to_string()))
}

fn required_id(id: Option<EntityId>, field: &str) -> Result<EntityId, ValidationError> {
    match id {
        Some(EntityId::Text(s)) if s.trim().is_empty() => Err(ValidationError::empty_field(field)),
        Some(id) => Ok(id),
        None => Err(ValidationError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_event_serializes_with_event_and_data() {
        let event = ServerEvent::joined_room(&RoomName::forum());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, json!({"event": "joined_room", "data": {"room": "forum"}}));
    }

    #[test]
    fn connected_omits_user_for_guests() {
        let event = ServerEvent::Connected(ConnectedMessage {
            message: "Connected as guest".into(),
            user: None,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"], json!({"message": "Connected as guest"}));
    }

    #[test]
    fn dice_result_serializes_rolls_as_nested_arrays() {
        let roll = DiceRoll {
            rolls: vec![[10, 10], [17, 3]],
            total: 40,
        };
        let event = ServerEvent::DiceResult(DiceResultMessage::new(roll, "mira"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "dice_result");
        assert_eq!(
            json["data"],
            json!({"total": 40, "rolls": [[10, 10], [17, 3]], "user": "mira"})
        );
    }

    #[test]
    fn event_names_match_serialized_tags() {
        let events = vec![
            ServerEvent::error("x"),
            ServerEvent::left_room(&RoomName::post("1")),
            ServerEvent::AdminNotification(json!({})),
            ServerEvent::CommentUpdated(json!({})),
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.name());
        }
    }

    #[test]
    fn parses_unit_events_without_data() {
        assert_eq!(
            ClientEvent::parse(r#"{"event": "join_forum"}"#).unwrap(),
            ClientEvent::JoinForum
        );
        assert_eq!(
            ClientEvent::parse(r#"{"event": "join_admin", "data": null}"#).unwrap(),
            ClientEvent::JoinAdmin
        );
    }

    #[test]
    fn parses_numeric_and_string_post_ids() {
        assert_eq!(
            ClientEvent::parse(r#"{"event": "join_post", "data": {"post_id": 12}}"#).unwrap(),
            ClientEvent::JoinPost {
                post_id: EntityId::Number(12)
            }
        );
        assert_eq!(
            ClientEvent::parse(r#"{"event": "leave_post", "data": {"post_id": "abc"}}"#).unwrap(),
            ClientEvent::LeavePost {
                post_id: EntityId::Text("abc".into())
            }
        );
    }

    #[test]
    fn missing_post_id_is_a_validation_error() {
        let err = ClientEvent::parse(r#"{"event": "join_post", "data": {}}"#).unwrap_err();
        assert_eq!(err, ValidationError::missing_field("post_id"));
    }

    #[test]
    fn roll_dice_defaults_to_double10() {
        assert_eq!(
            ClientEvent::parse(r#"{"event": "roll_dice", "data": {"room": "post_3"}}"#).unwrap(),
            ClientEvent::RollDice {
                dice_type: DiceType::Double10,
                room: Some(RoomName::post("3")),
            }
        );
    }

    #[test]
    fn unsupported_dice_type_is_rejected() {
        let err =
            ClientEvent::parse(r#"{"event": "roll_dice", "data": {"type": "d20"}}"#).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "type"));
    }

    #[test]
    fn editor_update_passes_payload_through() {
        let text = r#"{"event": "editor_update", "data": {
            "section_id": 7, "content": "<p>hi</p>", "cursor_position": 4, "timestamp": 1700000000
        }}"#;
        match ClientEvent::parse(text).unwrap() {
            ClientEvent::EditorUpdate(update) => {
                assert_eq!(update.section_id, EntityId::Number(7));
                assert_eq!(update.content, json!("<p>hi</p>"));
                assert_eq!(update.cursor_position, json!(4));
                assert_eq!(update.timestamp, json!(1700000000));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_event_and_bad_json_are_rejected() {
        assert!(ClientEvent::parse(r#"{"event": "fly"}"#).is_err());
        assert!(ClientEvent::parse("not json").is_err());
        assert!(ClientEvent::parse(r#"{"event": "join_post", "data": [1]}"#).is_err());
    }

    #[test]
    fn non_object_payloads_are_rejected_even_without_fields() {
        for data in ["[1]", "[]", "7", "\"post_12\"", "true"] {
            let frame = format!(r#"{{"event": "join_post", "data": {}}}"#, data);
            assert_eq!(
                ClientEvent::parse(&frame),
                Err(ValidationError::invalid_format("data", "payload must be a JSON object")),
                "accepted data {}",
                data
            );
        }
        assert!(ClientEvent::parse(r#"{"event": "join_forum", "data": ["x"]}"#).is_err());
        assert!(ClientEvent::parse(r#"{"event": "join_forum", "data": null}"#).is_ok());
    }
}
