//! Core domain models for the chat relay.

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, RoomName, Timestamp, Username};

/// The (username, room) identity bound to a live connection after a
/// successful join. Immutable once created; destroyed by leave/disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The connection carrying this identity
    pub connection_id: ConnectionId,
    /// Claimed display name, unique per room (case-insensitive)
    pub username: Username,
    /// The room the connection has joined
    pub room: RoomName,
    /// Timestamp when the join was accepted
    pub joined_at: Timestamp,
}

impl Binding {
    /// Create a new binding
    pub fn new(
        connection_id: ConnectionId,
        username: Username,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            username,
            room,
            joined_at,
        }
    }
}

/// A named chat room in the catalog.
///
/// Membership is not stored here; it is derived from the live connection
/// registry on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room name
    pub name: RoomName,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
}

impl Room {
    /// Create a new room
    pub fn new(name: RoomName, created_at: Timestamp) -> Self {
        Self { name, created_at }
    }
}

/// Classification of a chat message payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text message
    #[default]
    Text,
    /// Message carrying an uploaded image
    Image,
    /// Message carrying any other uploaded file
    File,
}

impl MessageKind {
    /// Body text substituted when a message carries only an attachment
    pub fn placeholder_body(&self) -> &'static str {
        match self {
            MessageKind::Image => "Sent an image",
            _ => "Sent a file",
        }
    }
}

/// A chat message as handed to the message store and replayed on join.
///
/// The author and room are always non-empty; the body is synthesized from
/// the kind when a client sends an attachment without text, so it is
/// non-empty as well by the time a message is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Author username
    pub author: Username,
    /// Message body text
    pub body: String,
    /// Room the message was sent to
    pub room: RoomName,
    /// Payload classification
    pub kind: MessageKind,
    /// URL of the uploaded attachment, when present
    pub file_url: Option<String>,
    /// Timestamp when the message was created
    pub created_at: Timestamp,
}

impl StoredMessage {
    /// Create a new stored message
    pub fn new(
        author: Username,
        body: String,
        room: RoomName,
        kind: MessageKind,
        file_url: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            author,
            body,
            room,
            kind,
            file_url,
            created_at,
        }
    }
}
