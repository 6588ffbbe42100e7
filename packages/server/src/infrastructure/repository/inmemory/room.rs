//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用し、単一の Mutex で全操作を直列化します。
//! ロック保持中に送信処理は行いません（通知対象は呼び出し側に返します）。

use std::collections::{HashMap, hash_map::Entry};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ExpiryPolicy, GuessOutcome, PlayerConnection, RepositoryError, Role, Room,
    RoomId, RoomIdFactory, RoomRepository, Timestamp,
};

/// Default maximum number of live rooms
pub const DEFAULT_ROOM_CAPACITY: usize = 1000;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// Room ID → Room
    rooms: Mutex<HashMap<RoomId, Room>>,
    /// 同時に存在できる Room の上限
    capacity: usize,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ROOM_CAPACITY)
    }

    /// Room 数の上限を指定して作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            capacity,
        }
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        host: PlayerConnection,
        now: Timestamp,
    ) -> Result<RoomId, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.len() >= self.capacity {
            return Err(RepositoryError::RoomLimitReached {
                capacity: self.capacity,
            });
        }

        // 衝突は事実上起こらないが、起きた場合は生成し直す
        loop {
            let room_id = RoomIdFactory::generate();
            if let Entry::Vacant(entry) = rooms.entry(room_id.clone()) {
                entry.insert(Room::new(room_id.clone(), host, now));
                return Ok(room_id);
            }
            tracing::warn!("Generated room id collided with a live room, retrying");
        }
    }

    async fn join_room(
        &self,
        room_id: &RoomId,
        joiner: PlayerConnection,
        now: Timestamp,
    ) -> Result<Option<PlayerConnection>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        Ok(room.join(joiner, now)?)
    }

    async fn set_secret(
        &self,
        room_id: &RoomId,
        secret: i64,
        now: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        room.set_secret(secret, now);
        Ok(())
    }

    async fn submit_guess(
        &self,
        room_id: &RoomId,
        guess: i64,
        now: Timestamp,
    ) -> Result<GuessOutcome, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        Ok(room.guess(guess, now)?)
    }

    async fn detach(
        &self,
        room_id: &RoomId,
        role: Role,
        connection_id: ConnectionId,
    ) -> Option<PlayerConnection> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(room_id)?;
        if !room.vacate(role, connection_id) {
            return None;
        }

        let peer = room.occupant(role.counterpart()).cloned();
        if room.is_empty() {
            rooms.remove(room_id);
            tracing::info!("Room '{}' removed: both players left", room_id);
        }
        peer
    }

    async fn remove_expired(&self, now: Timestamp, policy: ExpiryPolicy) -> Vec<Room> {
        let mut rooms = self.rooms.lock().await;
        let expired: Vec<RoomId> = rooms
            .values()
            .filter(|room| room.is_expired(now, &policy))
            .map(|room| room.id.clone())
            .collect();
        expired
            .iter()
            .filter_map(|room_id| rooms.remove(room_id))
            .collect()
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn count_rooms(&self) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.len()
    }
}
