//! UseCase: ルーム退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 冪等な束縛解除、退出通知と在室一覧の配信
//!
//! ### なぜこのテストが必要か
//! - 退出後の在室一覧に残留エントリが残らないことを保証
//! - 束縛のない接続の退出でも成功扱いになり、通知が出ないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系: 在室者の退出と残りの在室者への通知
//! - エッジケース: 束縛のない接続の退出（冪等）

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

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<Mutex<ConnectionRegistry>>,
    router: Arc<BroadcastRouter>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(registry: Arc<Mutex<ConnectionRegistry>>, router: Arc<BroadcastRouter>) -> Self {
        Self { registry, router }
    }

    /// ルーム退出を実行
    ///
    /// 束縛がない場合も成功として扱います（冪等）。退出通知と在室一覧は
    /// 束縛が実在した場合にのみ、束縛が持つルームへ配信します。
    pub async fn execute(&self, connection_id: ConnectionId) {
        // 1. 冪等な束縛解除
        let binding = {
            let mut registry = self.registry.lock().await;
            registry.unbind(connection_id)
        };
        let Some(binding) = binding else {
            return;
        };
        tracing::info!("'{}' left room '{}'", binding.username, binding.room);

        // 2. 退出通知（本人は既に在室一覧から外れている）
        let notice = ServerEvent::Message(MessageEvent::admin(
            format!("{} has left the room.", binding.username),
            timestamp_to_jst_hhmm(get_jst_timestamp()),
        ));
        self.router.to_room(&binding.room, &notice).await;

        // 3. 在室一覧の更新
        let presence = presence_event(&self.registry, &binding.room).await;
        self.router.to_room(&binding.room, &presence).await;
    }
}
