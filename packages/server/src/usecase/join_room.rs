//! UseCase: Room 参加処理

use std::sync::Arc;

use crate::domain::{
    PlayerConnection, RepositoryError, RoomError, RoomId, RoomRepository, Timestamp,
};

use super::error::JoinRoomError;

/// 参加に成功した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub room_id: RoomId,
    /// 参加を通知するホスト
    pub notify_host: Option<PlayerConnection>,
}

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl JoinRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// `joiner` を参加者枠に入れる
    ///
    /// `room_id` が `None` の場合（デコード時に不正と判定された ID）は `InvalidRoomId`。
    pub async fn execute(
        &self,
        room_id: Option<RoomId>,
        joiner: PlayerConnection,
    ) -> Result<JoinedRoom, JoinRoomError> {
        let room_id = room_id.ok_or(JoinRoomError::InvalidRoomId)?;
        let joiner_id = joiner.id;

        let notify_host = self
            .repository
            .join_room(&room_id, joiner, Timestamp::now())
            .await
            .map_err(|e| match e {
                RepositoryError::Room(RoomError::JoinerSlotOccupied) => {
                    JoinRoomError::RoomAlreadyFull
                }
                _ => JoinRoomError::RoomNotFound,
            })?;

        tracing::info!("Connection '{}' joined room '{}'", joiner_id, room_id);
        Ok(JoinedRoom {
            room_id,
            notify_host,
        })
    }
}
