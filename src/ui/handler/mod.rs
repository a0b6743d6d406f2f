//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{MAX_UPLOAD_BYTES, create_room, get_room_messages, get_rooms, health_check, upload_file};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
