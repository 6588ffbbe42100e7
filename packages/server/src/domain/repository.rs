//! Repository trait for the room registry.
//!
//! Every method runs under the registry's single exclusive section and never
//! performs outbound I/O. Connections that need a notification are handed back
//! to the caller, which sends after the section is released.

use async_trait::async_trait;

use super::{
    entity::{ExpiryPolicy, GuessOutcome, PlayerConnection, Room},
    error::RepositoryError,
    value_object::{ConnectionId, Role, RoomId, Timestamp},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Insert a fresh room held by `host`.
    ///
    /// Fails with `RoomLimitReached` when the registry is at capacity.
    async fn create_room(
        &self,
        host: PlayerConnection,
        now: Timestamp,
    ) -> Result<RoomId, RepositoryError>;

    /// Occupy the joiner slot, returning the host to notify.
    async fn join_room(
        &self,
        room_id: &RoomId,
        joiner: PlayerConnection,
        now: Timestamp,
    ) -> Result<Option<PlayerConnection>, RepositoryError>;

    async fn set_secret(
        &self,
        room_id: &RoomId,
        secret: i64,
        now: Timestamp,
    ) -> Result<(), RepositoryError>;

    async fn submit_guess(
        &self,
        room_id: &RoomId,
        guess: i64,
        now: Timestamp,
    ) -> Result<GuessOutcome, RepositoryError>;

    /// Clear `role`'s slot if `connection_id` still holds it.
    ///
    /// Returns the remaining peer to notify. Deletes the room once both slots
    /// are empty. Calling it again for the same connection is a no-op.
    async fn detach(
        &self,
        room_id: &RoomId,
        role: Role,
        connection_id: ConnectionId,
    ) -> Option<PlayerConnection>;

    /// Remove every expired room and return the removed rooms.
    async fn remove_expired(&self, now: Timestamp, policy: ExpiryPolicy) -> Vec<Room>;

    /// Snapshot of a room for inspection. Gameplay goes through the
    /// mutating operations above.
    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    async fn count_rooms(&self) -> usize;
}
