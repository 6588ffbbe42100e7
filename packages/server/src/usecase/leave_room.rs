//! UseCase: 切断時の退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, PlayerConnection, Role, RoomId, RoomRepository};

/// 退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl LeaveRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 接続が保持していた枠を空ける
    ///
    /// # Returns
    ///
    /// 切断を通知すべき相手。既に退出済みの場合は `None`。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        role: Role,
        connection_id: ConnectionId,
    ) -> Option<PlayerConnection> {
        let peer = self.repository.detach(room_id, role, connection_id).await;
        tracing::info!(
            "Connection '{}' left room '{}' as {}",
            connection_id,
            room_id,
            role
        );
        peer
    }
}
