//! Repository trait 定義
//!
//! 永続化サービス（ルームカタログ、メッセージストア）はドメイン層が定義する
//! trait として抽象化します。UseCase 層はこの trait に依存し、具体的な実装
//! （infrastructure 層）には直接依存しません（依存性の逆転）。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use super::{
    entity::{Room, StoredMessage},
    value_object::RoomName,
};

/// Errors reported by the room catalog
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A room with the same name already exists
    #[error("Room '{0}' already exists")]
    AlreadyExists(String),

    /// The catalog backend failed or timed out
    #[error("Room catalog unavailable: {0}")]
    Backend(String),
}

/// Errors reported by the message store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store backend failed or timed out
    #[error("Message store unavailable: {0}")]
    Backend(String),
}

/// 外部のルームカタログ。ルームの存在確認・作成・一覧を提供します。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RoomCatalog: Send + Sync {
    /// Report whether a room with the given name exists
    async fn exists(&self, name: &RoomName) -> Result<bool, CatalogError>;

    /// Create a room.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AlreadyExists` when the name is taken.
    async fn create(&self, name: RoomName) -> Result<Room, CatalogError>;

    /// List all rooms, ordered by name
    async fn list(&self) -> Result<Vec<Room>, CatalogError>;
}

/// 外部のメッセージストア。メッセージの追記と直近履歴の取得を提供します。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message to the durable log
    async fn append(&self, message: StoredMessage) -> Result<(), StoreError>;

    /// Up to `limit` most recent messages for a room, in chronological order
    async fn recent(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StoreError>;
}
