//! InMemory Repository 実装

mod room;

pub use room::{DEFAULT_ROOM_CAPACITY, InMemoryRoomRepository};
