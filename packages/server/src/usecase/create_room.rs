//! UseCase: Room 作成処理

use std::sync::Arc;

use crate::domain::{PlayerConnection, RoomId, RoomRepository, Timestamp};

use super::error::CreateRoomError;

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// `host` をホストとして新しい Room を作成し、その ID を返す
    pub async fn execute(&self, host: PlayerConnection) -> Result<RoomId, CreateRoomError> {
        let host_id = host.id;
        let room_id = self
            .repository
            .create_room(host, Timestamp::now())
            .await
            .map_err(|e| {
                tracing::warn!("Failed to create room: {}", e);
                CreateRoomError::RoomLimitReached
            })?;

        tracing::info!("Room '{}' created by connection '{}'", room_id, host_id);
        Ok(room_id)
    }
}
