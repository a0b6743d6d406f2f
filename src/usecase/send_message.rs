//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 束縛確認、入力検証、添付のみの場合の本文補完、
//!   永続化してからの配信（送信者含む）
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージが一瞬でも配信されないことを保証
//! - 未参加の接続からの送信を拒否する
//! - 添付のみのメッセージに種別どおりの本文が補われることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: テキスト送信、添付送信
//! - 異常系: 未参加、本文と添付の両方が空、ストア障害
//! - エッジケース: 送信者のみが在室している場合

use std::sync::Arc;

use tokio::{sync::Mutex, time::timeout};

use crate::{
    domain::{ConnectionId, ConnectionRegistry, MessageStore, RoomName, StoredMessage, Timestamp},
    infrastructure::{
        BroadcastRouter,
        dto::websocket::{MessageEvent, SendMessagePayload, ServerEvent},
    },
    time::{get_jst_timestamp, timestamp_to_jst_hhmm},
};

use super::{HubError, STORE_TIMEOUT};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    store: Arc<dyn MessageStore>,
    router: Arc<BroadcastRouter>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        store: Arc<dyn MessageStore>,
        router: Arc<BroadcastRouter>,
    ) -> Self {
        Self {
            registry,
            store,
            router,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 送信元の接続の ID
    /// * `payload` - 本文・ルーム・種別・添付 URL
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 永続化と配信の両方が完了
    /// * `Err(HubError)` - 送信失敗（配信は一切発生しない）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        payload: SendMessagePayload,
    ) -> Result<(), HubError> {
        // 1. 送信者の束縛を確認
        let binding = {
            let registry = self.registry.lock().await;
            registry.lookup(connection_id)
        }
        .ok_or(HubError::NotJoined)?;

        // 2. 入力検証（本文か添付のどちらかは必須）
        let has_body = payload.message.as_deref().is_some_and(|m| !m.is_empty());
        let has_file = payload.file_url.as_deref().is_some_and(|u| !u.is_empty());
        if (!has_body && !has_file) || payload.room.is_empty() {
            return Err(HubError::Validation(
                "Message/content and room are required".to_string(),
            ));
        }
        let room = RoomName::new(payload.room).map_err(|e| HubError::Validation(e.to_string()))?;

        // 3. 添付のみの場合は種別に応じた本文を補う
        let text = match payload.message {
            Some(message) if !message.is_empty() => message,
            _ => payload.kind.placeholder_body().to_string(),
        };
        let file_url = payload.file_url.filter(|u| !u.is_empty());

        // 4. 先に永続化（失敗したら配信しない）
        let created_at = Timestamp::new(get_jst_timestamp());
        let message = StoredMessage::new(
            binding.username.clone(),
            text,
            room.clone(),
            payload.kind,
            file_url,
            created_at,
        );
        timeout(STORE_TIMEOUT, self.store.append(message.clone()))
            .await
            .map_err(|_| HubError::Store("Message store timed out".to_string()))?
            .map_err(|e| HubError::Store(e.to_string()))?;

        // 5. ルーム全員（送信者含む）へ配信
        let event = ServerEvent::Message(MessageEvent {
            user: message.author.as_str().to_string(),
            text: message.body.clone(),
            time: timestamp_to_jst_hhmm(created_at.value()),
            kind: message.kind,
            file_url: message.file_url.clone(),
            is_current_user: Some(false),
        });
        self.router.to_room(&room, &event).await;

        Ok(())
    }
}
