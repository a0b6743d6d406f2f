//! UseCase: 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - レジストリエントリの破棄、配信チャンネルの切り離し、
//!   切断通知と在室一覧の配信
//!
//! ### なぜこのテストが必要か
//! - 切断後の在室一覧に残留エントリが残らないことを保証
//! - 切断通知がちょうど 1 回、残りの在室者だけに届くことを確認
//! - クライアントに ack 経路がないため、失敗しても内部で完結すること
//!
//! ### どのような状況を想定しているか
//! - 正常系: 在室中の接続の切断
//! - エッジケース: 参加前の接続の切断（通知なし）

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, ConnectionRegistry},
    infrastructure::{
        BroadcastRouter,
        dto::websocket::{MessageEvent, ServerEvent},
    },
    time::{get_jst_timestamp, timestamp_to_jst_hhmm},
};

use super::presence_event;

/// 切断のユースケース
///
/// トランスポート層のイベントから呼ばれるため、クライアントへの失敗通知は
/// 存在しません。どのような場合でもレジストリエントリは破棄されます。
pub struct DisconnectUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    router: Arc<BroadcastRouter>,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
    pub fn new(registry: Arc<Mutex<ConnectionRegistry>>, router: Arc<BroadcastRouter>) -> Self {
        Self { registry, router }
    }

    /// 切断を実行
    pub async fn execute(&self, connection_id: ConnectionId) {
        // 1. レジストリから破棄し、配信チャンネルを外す
        let binding = {
            let mut registry = self.registry.lock().await;
            registry.remove(connection_id)
        };
        self.router.detach(connection_id).await;

        let Some(binding) = binding else {
            tracing::debug!("Connection '{}' disconnected before joining", connection_id);
            return;
        };
        tracing::info!(
            "'{}' disconnected from room '{}'",
            binding.username,
            binding.room
        );

        // 2. 切断通知
        let notice = ServerEvent::Message(MessageEvent::admin(
            format!("{} has disconnected.", binding.username),
            timestamp_to_jst_hhmm(get_jst_timestamp()),
        ));
        self.router.to_room(&binding.room, &notice).await;

        // 3. 在室一覧の更新
        let presence = presence_event(&self.registry, &binding.room).await;
        self.router.to_room(&binding.room, &presence).await;
    }
}
