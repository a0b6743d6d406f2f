//! WebSocket frame DTOs for the chat relay.
//!
//! Inbound frames are a tagged union over the `event` field; payload fields
//! use camelCase on the wire. Malformed frames are rejected at the transport
//! boundary before they reach the lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::domain::MessageKind;

/// Inbound client event, `{"event": "...", "data": {...}}`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Join a room under a claimed username
    Join(JoinPayload),
    /// Send a text or attachment message to a room
    SendMessage(SendMessagePayload),
    /// Ephemeral typing signal, fire-and-forget
    Typing(TypingPayload),
    /// Leave the currently joined room
    LeaveRoom(LeaveRoomPayload),
}

/// `join` payload
#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub username: String,
    pub room: String,
}

/// `sendMessage` payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub message: Option<String>,
    pub room: String,
    /// Payload classification, `text` when omitted
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// `typing` payload
#[derive(Debug, Clone, Deserialize)]
pub struct TypingPayload {
    pub room: String,
    pub username: String,
}

/// `leaveRoom` payload
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRoomPayload {
    pub username: String,
    pub room: String,
}

/// Outbound server event, `{"event": "...", "data": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Chat message or admin notice
    Message(MessageEvent),
    /// Presence update for a room
    RoomUsers(RoomUsersEvent),
    /// A peer is typing
    Typing(TypingEvent),
    /// Acknowledgment of a client-initiated event
    Ack(AckEvent),
}

/// `message` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub user: String,
    pub text: String,
    /// Wall-clock `HH:MM` rendering of the creation timestamp (JST)
    pub time: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Set on live messages and history replay, absent on admin notices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_current_user: Option<bool>,
}

impl MessageEvent {
    /// Build an admin notice (welcome, joined/left/disconnected)
    pub fn admin(text: String, time: String) -> Self {
        Self {
            user: "Admin".to_string(),
            text,
            time,
            kind: MessageKind::Text,
            file_url: None,
            is_current_user: None,
        }
    }
}

/// `roomUsers` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomUsersEvent {
    pub room: String,
    pub users: Vec<RoomUserDto>,
}

/// One occupant in a `roomUsers` presence listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUserDto {
    pub username: String,
    pub connection_id: String,
}

/// `typing` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingEvent {
    pub username: String,
}

/// `ack` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckEvent {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AckErrorDto>,
}

/// Structured error carried on a failed acknowledgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckErrorDto {
    pub kind: String,
    pub message: String,
}

impl AckEvent {
    /// Successful acknowledgment
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed acknowledgment with a stable kind and a readable message
    pub fn error(kind: &str, message: String) -> Self {
        Self {
            success: false,
            error: Some(AckErrorDto {
                kind: kind.to_string(),
                message,
            }),
        }
    }
}
