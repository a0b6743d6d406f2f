//! UseCase: 入力中通知処理
//!
//! サーバー側に状態を持たない ephemeral なシグナル。永続化も ack もせず、
//! 送信者以外の在室者へそのまま転送します。デバウンスはクライアント側の
//! 責務で、ハブはイベントごとに独立して転送します。

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, RoomName},
    infrastructure::{
        BroadcastRouter,
        dto::websocket::{ServerEvent, TypingEvent, TypingPayload},
    },
};

/// 入力中通知のユースケース
pub struct TypingUseCase {
    router: Arc<BroadcastRouter>,
}

impl TypingUseCase {
    /// 新しい TypingUseCase を作成
    pub fn new(router: Arc<BroadcastRouter>) -> Self {
        Self { router }
    }

    /// 入力中通知を送信者以外の在室者へ転送
    pub async fn execute(&self, connection_id: ConnectionId, payload: TypingPayload) {
        let Ok(room) = RoomName::new(payload.room) else {
            tracing::debug!("Typing event with invalid room dropped");
            return;
        };
        let event = ServerEvent::Typing(TypingEvent {
            username: payload.username,
        });
        self.router.to_room_except(&room, connection_id, &event).await;
    }
}
