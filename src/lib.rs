//! Room-based chat relay server library.
//!
//! Clients join named rooms over WebSocket, exchange text and file messages,
//! see live presence and typing status, and receive recent history on join.
//! The HTTP surface covers room listing/creation, message history and file
//! uploads.

pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod time;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use ui::{ServerConfig, run_server};
