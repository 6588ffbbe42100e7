//! Background task that periodically removes expired rooms.

use std::{sync::Arc, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::{
    domain::{ExpiryPolicy, RoomRepository, Timestamp},
    infrastructure::dto::websocket::ServerMessage,
    ui::session::send_best_effort,
    usecase::ReapRoomsUseCase,
};

const ROOM_EXPIRED: &str = "Room expired.";

/// Spawn the sweep. It runs every `period` until the handle is aborted.
pub fn spawn_reaper(
    repository: Arc<dyn RoomRepository>,
    policy: ExpiryPolicy,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let usecase = ReapRoomsUseCase::new(repository, policy);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = usecase.execute(Timestamp::now()).await;
            if !removed.is_empty() {
                tracing::info!("Reaper removed {} expired room(s)", removed.len());
            }
            for room in &removed {
                for occupant in &room.occupants {
                    send_best_effort(occupant, &ServerMessage::status(ROOM_EXPIRED));
                }
            }
        }
    })
}
