//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 入力検証、ルーム存在確認、原子的な重複チェックと束縛、
//!   固定順のブロードキャスト、履歴リプレイ
//!
//! ### なぜこのテストが必要か
//! - 同名ユーザーの同時参加で両方が束縛される競合を防ぐ
//! - 参加者自身の welcome が履歴より先に届く順序保証を確認
//! - 失敗した遷移がレジストリの状態を変えないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系: 参加成功、welcome / 参加通知 / 在室一覧 / 履歴の配信
//! - 異常系: 空の入力、存在しないルーム、重複ユーザー名
//! - エッジケース: 履歴取得の失敗（参加自体は成立させる）

use std::sync::Arc;

use tokio::{sync::Mutex, time::timeout};

use crate::{
    domain::{
        ConnectionId, ConnectionRegistry, MessageStore, RoomCatalog, RoomName, Timestamp, Username,
    },
    infrastructure::{
        BroadcastRouter,
        dto::websocket::{JoinPayload, MessageEvent, ServerEvent},
    },
    time::{get_jst_timestamp, timestamp_to_jst_hhmm},
};

use super::{HubError, STORE_TIMEOUT, presence_event};

/// Number of persisted messages replayed to a joining connection
const HISTORY_LIMIT: usize = 100;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    catalog: Arc<dyn RoomCatalog>,
    store: Arc<dyn MessageStore>,
    router: Arc<BroadcastRouter>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        catalog: Arc<dyn RoomCatalog>,
        store: Arc<dyn MessageStore>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            registry,
            catalog,
            store,
            router,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 参加する接続の ID
    /// * `payload` - クライアントが申告した username と room
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 参加成功（welcome・参加通知・在室一覧・履歴を配信済み）
    /// * `Err(HubError)` - 参加失敗（レジストリの状態は変化しない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        payload: JoinPayload,
    ) -> Result<(), HubError> {
        // 1. 入力検証
        if payload.username.is_empty() || payload.room.is_empty() {
            return Err(HubError::Validation(
                "Username and room are required".to_string(),
            ));
        }
        let username =
            Username::new(payload.username).map_err(|e| HubError::Validation(e.to_string()))?;
        let room = RoomName::new(payload.room).map_err(|e| HubError::Validation(e.to_string()))?;

        // 2. ルームの存在確認（レジストリのロックは保持しない）
        let exists = timeout(STORE_TIMEOUT, self.catalog.exists(&room))
            .await
            .map_err(|_| HubError::Store("Room catalog timed out".to_string()))?
            .map_err(|e| HubError::Store(e.to_string()))?;
        if !exists {
            return Err(HubError::RoomNotFound);
        }

        // 3. 重複チェックと束縛を 1 つのクリティカルセクションで行う
        let joined_at = Timestamp::new(get_jst_timestamp());
        {
            let mut registry = self.registry.lock().await;
            registry.bind(connection_id, username.clone(), room.clone(), joined_at)?;
        }
        tracing::info!("'{}' joined room '{}'", username, room);

        // 4. 本人への welcome
        let time = timestamp_to_jst_hhmm(joined_at.value());
        let welcome = ServerEvent::Message(MessageEvent::admin(
            format!("Welcome to {}, {}!", room, username),
            time.clone(),
        ));
        self.router.to_connection(connection_id, &welcome).await;

        // 5. 他の在室者への参加通知
        let joined_notice =
            ServerEvent::Message(MessageEvent::admin(format!("{} has joined!", username), time));
        self.router
            .to_room_except(&room, connection_id, &joined_notice)
            .await;

        // 6. 在室一覧の更新（ルーム全員へ）
        let presence = presence_event(&self.registry, &room).await;
        self.router.to_room(&room, &presence).await;

        // 7. 直近履歴のリプレイ（本人のみ、時系列、welcome より必ず後）
        //    取得失敗は参加を取り消さず、リプレイだけを諦める
        match timeout(STORE_TIMEOUT, self.store.recent(&room, HISTORY_LIMIT)).await {
            Ok(Ok(history)) => {
                for message in history {
                    let event = ServerEvent::Message(MessageEvent {
                        user: message.author.as_str().to_string(),
                        text: message.body.clone(),
                        time: timestamp_to_jst_hhmm(message.created_at.value()),
                        kind: message.kind,
                        file_url: message.file_url.clone(),
                        is_current_user: Some(message.author.as_str() == username.as_str()),
                    });
                    self.router.to_connection(connection_id, &event).await;
                }
            }
            Ok(Err(e)) => {
                tracing::warn!("History replay for room '{}' skipped: {}", room, e);
            }
            Err(_) => {
                tracing::warn!("History replay for room '{}' timed out", room);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            CatalogError, MessageKind, MockMessageStore, MockRoomCatalog, StoreError,
            StoredMessage,
        },
        infrastructure::repository::{InMemoryMessageStore, InMemoryRoomCatalog},
    };
    use tokio::sync::mpsc;

    struct TestHub {
        registry: Arc<Mutex<ConnectionRegistry>>,
        catalog: Arc<InMemoryRoomCatalog>,
        store: Arc<InMemoryMessageStore>,
        router: Arc<BroadcastRouter>,
    }

    async fn create_test_hub() -> TestHub {
        let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let catalog = Arc::new(InMemoryRoomCatalog::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let router = Arc::new(BroadcastRouter::new(registry.clone()));
        catalog
            .create(RoomName::new("general".to_string()).unwrap())
            .await
            .unwrap();
        TestHub {
            registry,
            catalog,
            store,
            router,
        }
    }

    impl TestHub {
        fn join_usecase(&self) -> JoinRoomUseCase {
            JoinRoomUseCase::new(
                self.registry.clone(),
                self.catalog.clone(),
                self.store.clone(),
                self.router.clone(),
            )
        }

        async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = self.registry.lock().await.register();
            self.router.attach(id, tx).await;
            (id, rx)
        }
    }

    fn payload(username: &str, room: &str) -> JoinPayload {
        JoinPayload {
            username: username.to_string(),
            room: room.to_string(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn test_join_success_broadcast_order() {
        // テスト項目: 参加成功時、本人には welcome → 在室一覧の順で届く
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = hub.join_usecase();
        let (alice, mut alice_rx) = hub.connect().await;

        // when (操作):
        let result = usecase.execute(alice, payload("alice", "general")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let frames = drain(&mut alice_rx);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["event"], "message");
        assert_eq!(frames[0]["data"]["user"], "Admin");
        assert_eq!(frames[0]["data"]["text"], "Welcome to general, alice!");
        assert_eq!(frames[1]["event"], "roomUsers");
        assert_eq!(frames[1]["data"]["users"][0]["username"], "alice");
    }

    #[tokio::test]
    async fn test_join_notifies_existing_members() {
        // テスト項目: 2 人目の参加で既存の在室者に参加通知と在室一覧が届く
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = hub.join_usecase();
        let (alice, mut alice_rx) = hub.connect().await;
        usecase.execute(alice, payload("alice", "general")).await.unwrap();
        drain(&mut alice_rx);

        // when (操作):
        let (bob, mut bob_rx) = hub.connect().await;
        usecase.execute(bob, payload("bob", "general")).await.unwrap();

        // then (期待する結果): alice には参加通知 → 2 人の在室一覧
        let alice_frames = drain(&mut alice_rx);
        assert_eq!(alice_frames.len(), 2);
        assert_eq!(alice_frames[0]["data"]["text"], "bob has joined!");
        assert_eq!(alice_frames[1]["event"], "roomUsers");
        assert_eq!(alice_frames[1]["data"]["users"].as_array().unwrap().len(), 2);

        // bob 自身には参加通知は届かない（welcome と在室一覧のみ）
        let bob_frames = drain(&mut bob_rx);
        assert_eq!(bob_frames.len(), 2);
        assert_eq!(bob_frames[0]["data"]["text"], "Welcome to general, bob!");
        assert_eq!(bob_frames[1]["event"], "roomUsers");
    }

    #[tokio::test]
    async fn test_join_empty_fields_fails() {
        // テスト項目: username または room が空なら ValidationError になる
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = hub.join_usecase();
        let (id, mut rx) = hub.connect().await;

        // when (操作):
        let result = usecase.execute(id, payload("", "general")).await;

        // then (期待する結果): エラーになり、何も配信されない
        assert_eq!(
            result.unwrap_err(),
            HubError::Validation("Username and room are required".to_string())
        );
        assert!(hub.registry.lock().await.lookup(id).is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_join_nonexistent_room_fails() {
        // テスト項目: 存在しないルームへの参加は RoomNotFound になり、配信は発生しない
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = hub.join_usecase();
        let (id, mut rx) = hub.connect().await;

        // when (操作):
        let result = usecase.execute(id, payload("alice", "nonexistent")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), HubError::RoomNotFound);
        assert!(hub.registry.lock().await.lookup(id).is_none());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_join_username_taken_case_insensitive() {
        // テスト項目: 大文字小文字違いの同名参加は UsernameTaken になり、状態は不変
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = hub.join_usecase();
        let (first, _first_rx) = hub.connect().await;
        usecase.execute(first, payload("Sam", "general")).await.unwrap();

        // when (操作):
        let (second, mut second_rx) = hub.connect().await;
        let result = usecase.execute(second, payload("sam", "general")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), HubError::UsernameTaken);
        assert!(drain(&mut second_rx).is_empty());
        let room = RoomName::new("general".to_string()).unwrap();
        let members = hub.registry.lock().await.members_of(&room);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username.as_str(), "Sam");
    }

    #[tokio::test]
    async fn test_join_replays_history_after_welcome() {
        // テスト項目: 履歴は welcome・在室一覧の後に時系列で届き、
        //             本人のメッセージに isCurrentUser が立つ
        // given (前提条件):
        let hub = create_test_hub().await;
        let room = RoomName::new("general".to_string()).unwrap();
        hub.store
            .append(StoredMessage::new(
                Username::new("alice".to_string()).unwrap(),
                "first".to_string(),
                room.clone(),
                MessageKind::Text,
                None,
                Timestamp::new(1000),
            ))
            .await
            .unwrap();
        hub.store
            .append(StoredMessage::new(
                Username::new("bob".to_string()).unwrap(),
                "second".to_string(),
                room.clone(),
                MessageKind::Text,
                None,
                Timestamp::new(2000),
            ))
            .await
            .unwrap();
        let usecase = hub.join_usecase();
        let (alice, mut alice_rx) = hub.connect().await;

        // when (操作):
        usecase.execute(alice, payload("alice", "general")).await.unwrap();

        // then (期待する結果): welcome → roomUsers → 履歴 2 件
        let frames = drain(&mut alice_rx);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0]["data"]["text"], "Welcome to general, alice!");
        assert_eq!(frames[1]["event"], "roomUsers");
        assert_eq!(frames[2]["data"]["text"], "first");
        assert_eq!(frames[2]["data"]["isCurrentUser"], true);
        assert_eq!(frames[3]["data"]["text"], "second");
        assert_eq!(frames[3]["data"]["isCurrentUser"], false);
    }

    #[tokio::test]
    async fn test_join_twice_fails_already_bound() {
        // テスト項目: 参加済みの接続からの再参加は AlreadyBound になる
        // given (前提条件):
        let hub = create_test_hub().await;
        let usecase = hub.join_usecase();
        let (alice, _alice_rx) = hub.connect().await;
        usecase.execute(alice, payload("alice", "general")).await.unwrap();

        // when (操作):
        let result = usecase.execute(alice, payload("alice2", "general")).await;

        // then (期待する結果): 元の束縛はそのまま
        assert_eq!(result.unwrap_err(), HubError::AlreadyBound);
        let binding = hub.registry.lock().await.lookup(alice).unwrap();
        assert_eq!(binding.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_join_catalog_failure_becomes_store_error() {
        // テスト項目: ルームカタログの障害は storeError として報告され、束縛されない
        // given (前提条件):
        let hub = create_test_hub().await;
        let mut mock_catalog = MockRoomCatalog::new();
        mock_catalog
            .expect_exists()
            .returning(|_| Err(CatalogError::Backend("down".to_string())));
        let usecase = JoinRoomUseCase::new(
            hub.registry.clone(),
            Arc::new(mock_catalog),
            hub.store.clone(),
            hub.router.clone(),
        );
        let (alice, mut alice_rx) = hub.connect().await;

        // when (操作):
        let result = usecase.execute(alice, payload("alice", "general")).await;

        // then (期待する結果):
        assert!(matches!(result.unwrap_err(), HubError::Store(_)));
        assert!(hub.registry.lock().await.lookup(alice).is_none());
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[tokio::test]
    async fn test_join_survives_history_failure() {
        // テスト項目: 履歴取得が失敗しても参加は成立し、welcome は届く
        // given (前提条件):
        let hub = create_test_hub().await;
        let mut mock_store = MockMessageStore::new();
        mock_store
            .expect_recent()
            .returning(|_, _| Err(StoreError::Backend("boom".to_string())));
        let usecase = JoinRoomUseCase::new(
            hub.registry.clone(),
            hub.catalog.clone(),
            Arc::new(mock_store),
            hub.router.clone(),
        );
        let (alice, mut alice_rx) = hub.connect().await;

        // when (操作):
        let result = usecase.execute(alice, payload("alice", "general")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(hub.registry.lock().await.lookup(alice).is_some());
        let frames = drain(&mut alice_rx);
        assert_eq!(frames.len(), 2); // welcome と在室一覧のみ
    }
}
