//! UseCase: 期限切れ Room の回収処理

use std::sync::Arc;

use guessroom_shared::time::{get_utc_timestamp, timestamp_to_rfc3339};

use crate::domain::{ExpiryPolicy, PlayerConnection, Role, RoomId, RoomRepository, Timestamp};

/// 回収された Room と、通知すべき残りの接続
#[derive(Debug)]
pub struct ReapedRoom {
    pub room_id: RoomId,
    pub occupants: Vec<PlayerConnection>,
}

/// 期限切れ Room 回収のユースケース
pub struct ReapRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    policy: ExpiryPolicy,
}

impl ReapRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, policy: ExpiryPolicy) -> Self {
        Self { repository, policy }
    }

    /// `now` の時点で期限切れの Room を全て削除し、削除した Room を返す
    pub async fn execute(&self, now: Timestamp) -> Vec<ReapedRoom> {
        let removed = self.repository.remove_expired(now, self.policy).await;
        let wall_now = get_utc_timestamp();
        removed
            .into_iter()
            .map(|room| {
                let age = now.elapsed_since(room.created_at);
                let created_at = wall_now - i64::try_from(age.as_millis()).unwrap_or(0);
                tracing::info!(
                    "Reaped room '{}' (created at {})",
                    room.id,
                    timestamp_to_rfc3339(created_at).unwrap_or_default()
                );
                let occupants = [Role::Host, Role::Joiner]
                    .into_iter()
                    .filter_map(|role| room.occupant(role).cloned())
                    .collect();
                ReapedRoom {
                    room_id: room.id,
                    occupants,
                }
            })
            .collect()
    }
}
