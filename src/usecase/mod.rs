//! UseCase 層
//!
//! セッションライフサイクルの状態遷移（join / sendMessage / typing /
//! leaveRoom / disconnect）を 1 遷移 1 ユースケースとして実装するレイヤー。
//! UI 層から呼び出され、Domain 層のレジストリと外部コラボレータを操作します。
//!
//! 1 つの遷移内のブロードキャストは固定順（本人宛 welcome → ルーム通知 →
//! 在室一覧 → 履歴リプレイ）で発行します。レジストリのロックを保持したまま
//! 永続化呼び出しを await しません。

use std::time::Duration;

use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionRegistry, RoomName},
    infrastructure::dto::websocket::{RoomUserDto, RoomUsersEvent, ServerEvent},
};

pub mod disconnect;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod send_message;
pub mod typing;

pub use disconnect::DisconnectUseCase;
pub use error::HubError;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;

/// Bound applied to every persistence/catalog call
pub(crate) const STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a `roomUsers` presence event from a fresh registry snapshot.
///
/// The snapshot is taken under the registry lock and the lock is released
/// before the event is delivered.
pub(crate) async fn presence_event(
    registry: &Mutex<ConnectionRegistry>,
    room: &RoomName,
) -> ServerEvent {
    let members = registry.lock().await.members_of(room);
    ServerEvent::RoomUsers(RoomUsersEvent {
        room: room.as_str().to_string(),
        users: members
            .iter()
            .map(|binding| RoomUserDto {
                username: binding.username.as_str().to_string(),
                connection_id: binding.connection_id.to_string(),
            })
            .collect(),
    })
}
