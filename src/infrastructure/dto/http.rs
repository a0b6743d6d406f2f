//! HTTP API request/response DTOs for the chat relay.

use serde::{Deserialize, Serialize};

use crate::domain::MessageKind;

/// Room summary for the list and create endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub name: String,
    pub created_at: String, // ISO 8601
}

/// One message in a history listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub user: String,
    pub text: String,
    pub room: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub created_at: String, // ISO 8601
}

/// Request body for room creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// Response for a stored upload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponseDto {
    pub file_url: String,
    /// `image` for common image extensions, `file` otherwise
    pub file_type: MessageKind,
}

/// Error body returned by the REST endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}
