//! Infrastructure layer: broadcast fan-out, wire DTOs and repository
//! implementations.

pub mod broadcast;
pub mod dto;
pub mod repository;

pub use broadcast::BroadcastRouter;
