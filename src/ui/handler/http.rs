//! HTTP API endpoint handlers.

use std::{path::Path as FilePath, sync::Arc};

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::{
    domain::{CatalogError, MessageKind, RoomName, StoredMessage},
    infrastructure::dto::http::{
        CreateRoomRequest, ErrorDto, MessageDto, RoomSummaryDto, UploadResponseDto,
    },
    time::{get_jst_timestamp, timestamp_to_jst_rfc3339},
    ui::state::AppState,
};

/// Maximum accepted upload size in bytes (10 MB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Number of messages returned by the history endpoint
const MESSAGE_LISTING_LIMIT: usize = 100;

type ErrorResponse = (StatusCode, Json<ErrorDto>);

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms, ordered by name
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, ErrorResponse> {
    let rooms = state.catalog.list().await.map_err(|e| {
        tracing::error!("Failed to list rooms: {}", e);
        internal_error("Failed to fetch rooms")
    })?;

    let listing = rooms
        .into_iter()
        .map(|room| RoomSummaryDto {
            created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
            name: room.name.into_string(),
        })
        .collect();

    Ok(Json(listing))
}

/// Create a new room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomSummaryDto>), ErrorResponse> {
    if body.name.is_empty() {
        return Err(bad_request("Room name is required"));
    }
    let name = RoomName::new(body.name).map_err(|e| bad_request(&e.to_string()))?;

    match state.catalog.create(name).await {
        Ok(room) => Ok((
            StatusCode::CREATED,
            Json(RoomSummaryDto {
                created_at: timestamp_to_jst_rfc3339(room.created_at.value()),
                name: room.name.into_string(),
            }),
        )),
        Err(CatalogError::AlreadyExists(_)) => Err(bad_request("Room already exists")),
        Err(e) => {
            tracing::error!("Failed to create room: {}", e);
            Err(internal_error("Failed to create room"))
        }
    }
}

/// Get recent messages for a room, in chronological order
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Json<Vec<MessageDto>>, ErrorResponse> {
    let room = RoomName::new(room).map_err(|e| bad_request(&e.to_string()))?;

    let messages = state
        .store
        .recent(&room, MESSAGE_LISTING_LIMIT)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch messages for '{}': {}", room, e);
            internal_error("Failed to fetch messages")
        })?;

    Ok(Json(messages.into_iter().map(message_dto).collect()))
}

/// Store an uploaded file and report its public URL and classification
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponseDto>, ErrorResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Invalid multipart request: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        // Keep only the final path component of the client-supplied name
        let original_name = field
            .file_name()
            .map(|name| name.rsplit(['/', '\\']).next().unwrap_or("").to_string())
            .unwrap_or_default();
        if original_name.is_empty() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| bad_request(&format!("Failed to read upload: {e}")))?;

        let stored_name = format!("{}-{}", get_jst_timestamp(), original_name);
        let path = state.upload_dir.join(&stored_name);
        tokio::fs::write(&path, &data).await.map_err(|e| {
            tracing::error!("Failed to store upload '{}': {}", stored_name, e);
            internal_error("Failed to store upload")
        })?;
        tracing::info!("Stored upload '{}' ({} bytes)", stored_name, data.len());

        return Ok(Json(UploadResponseDto {
            file_url: format!("/uploads/{stored_name}"),
            file_type: classify_upload(&stored_name),
        }));
    }

    Err(bad_request("No file uploaded"))
}

fn message_dto(message: StoredMessage) -> MessageDto {
    MessageDto {
        user: message.author.into_string(),
        text: message.body,
        room: message.room.into_string(),
        kind: message.kind,
        file_url: message.file_url,
        created_at: timestamp_to_jst_rfc3339(message.created_at.value()),
    }
}

/// Classify an uploaded file as image or generic file by extension
fn classify_upload(filename: &str) -> MessageKind {
    let ext = FilePath::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg" | "png" | "gif" | "webp") => MessageKind::Image,
        _ => MessageKind::File,
    }
}

fn bad_request(message: &str) -> ErrorResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorDto {
            error: message.to_string(),
        }),
    )
}

fn internal_error(message: &str) -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDto {
            error: message.to_string(),
        }),
    )
}
