//! InMemory Room Catalog 実装
//!
//! ドメイン層が定義する RoomCatalog trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! DBMS を使う実装に置き換える場合は、DB の行をドメインモデルへ変換する
//! DTO 層がここに入ります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{CatalogError, Room, RoomCatalog, RoomName, Timestamp},
    time::get_jst_timestamp,
};

/// インメモリ Room Catalog 実装
#[derive(Default)]
pub struct InMemoryRoomCatalog {
    rooms: Mutex<HashMap<String, Room>>,
}

impl InMemoryRoomCatalog {
    /// 新しい InMemoryRoomCatalog を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomCatalog for InMemoryRoomCatalog {
    async fn exists(&self, name: &RoomName) -> Result<bool, CatalogError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.contains_key(name.as_str()))
    }

    async fn create(&self, name: RoomName) -> Result<Room, CatalogError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(name.as_str()) {
            return Err(CatalogError::AlreadyExists(name.into_string()));
        }
        let room = Room::new(name, Timestamp::new(get_jst_timestamp()));
        rooms.insert(room.name.as_str().to_string(), room.clone());
        Ok(room)
    }

    async fn list(&self) -> Result<Vec<Room>, CatalogError> {
        let rooms = self.rooms.lock().await;
        let mut listing: Vec<Room> = rooms.values().cloned().collect();
        listing.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_name(name: &str) -> RoomName {
        RoomName::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_exists() {
        // テスト項目: 作成したルームは exists で確認できる
        // given (前提条件):
        let catalog = InMemoryRoomCatalog::new();

        // when (操作):
        let created = catalog.create(room_name("general")).await;

        // then (期待する結果):
        assert!(created.is_ok());
        assert!(catalog.exists(&room_name("general")).await.unwrap());
        assert!(!catalog.exists(&room_name("coding")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        // テスト項目: 同名ルームの作成はエラーになる
        // given (前提条件):
        let catalog = InMemoryRoomCatalog::new();
        catalog.create(room_name("general")).await.unwrap();

        // when (操作):
        let result = catalog.create(room_name("general")).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            CatalogError::AlreadyExists("general".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        // テスト項目: 一覧はルーム名の昇順で返される
        // given (前提条件):
        let catalog = InMemoryRoomCatalog::new();
        catalog.create(room_name("music")).await.unwrap();
        catalog.create(room_name("coding")).await.unwrap();
        catalog.create(room_name("general")).await.unwrap();

        // when (操作):
        let listing = catalog.list().await.unwrap();

        // then (期待する結果):
        let names: Vec<&str> = listing.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["coding", "general", "music"]);
    }
}
