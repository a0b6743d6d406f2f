//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Username validation error
    #[error("Username cannot be empty")]
    UsernameEmpty,

    /// Username too long error
    #[error("Username cannot exceed {max} characters (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    /// RoomName validation error
    #[error("Room name cannot be empty")]
    RoomNameEmpty,

    /// RoomName too long error
    #[error("Room name cannot exceed {max} characters (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },
}

/// Errors related to the Connection Registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The connection was never registered, or was already removed
    #[error("Connection '{0}' is not registered")]
    UnknownConnection(ConnectionId),

    /// The connection already carries a (username, room) binding
    #[error("Connection '{0}' has already joined a room")]
    AlreadyBound(ConnectionId),

    /// Another live connection in the room holds the same username
    /// (compared case-insensitively)
    #[error("Username '{username}' is already taken in room '{room}'")]
    UsernameTaken { username: String, room: String },
}
