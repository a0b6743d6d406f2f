//! Domain layer for the chat relay.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{Binding, MessageKind, Room, StoredMessage};
pub use error::{RegistryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use registry::ConnectionRegistry;
pub use repository::{CatalogError, MessageStore, RoomCatalog, StoreError};
pub use value_object::{ConnectionId, RoomName, Timestamp, Username};

#[cfg(test)]
pub use repository::{MockMessageStore, MockRoomCatalog};
