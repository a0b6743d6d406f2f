//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RegistryError;

/// Errors a client-initiated lifecycle transition can report.
///
/// Every variant maps to a stable ack kind string plus a human-readable
/// message; none are fatal to the hub, and a failed transition leaves the
/// registry state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// A required field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// The target room is absent from the room catalog
    #[error("Room does not exist")]
    RoomNotFound,

    /// Another live connection in the room holds the same username
    #[error("Username is already taken in this room")]
    UsernameTaken,

    /// The connection has already joined a room
    #[error("Already joined a room")]
    AlreadyBound,

    /// The connection has no binding (never joined, or already left)
    #[error("User not found")]
    NotJoined,

    /// A persistence or catalog call failed or timed out
    #[error("{0}")]
    Store(String),
}

impl HubError {
    /// Stable ack kind string for the transport boundary
    pub fn kind(&self) -> &'static str {
        match self {
            HubError::Validation(_) => "validationError",
            HubError::RoomNotFound => "roomNotFound",
            HubError::UsernameTaken => "usernameTaken",
            HubError::AlreadyBound => "alreadyBound",
            HubError::NotJoined => "notJoined",
            HubError::Store(_) => "storeError",
        }
    }
}

impl From<RegistryError> for HubError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownConnection(_) => HubError::NotJoined,
            RegistryError::AlreadyBound(_) => HubError::AlreadyBound,
            RegistryError::UsernameTaken { .. } => HubError::UsernameTaken,
        }
    }
}
