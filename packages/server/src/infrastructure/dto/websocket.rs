//! WebSocket message DTOs for the guessing game.

use serde::Serialize;

use crate::domain::{GuessResult, Role, RoomId};

/// Decoded inbound message.
///
/// Field values that fail validation are kept as `None` so the session can
/// answer with the error that matches its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    CreateRoom,
    JoinRoom { room_id: Option<RoomId> },
    SetSecret { secret: Option<i64> },
    Guess { guess: Option<i64> },
    /// Any other `type` value
    Other { message_type: String },
}

/// Outbound message, serialized with a `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated { room_id: String },
    RoomJoined { room_id: String, role: Role },
    Status { message: String },
    GuessResult { result: GuessResult, guesses: u32 },
    Error { message: String },
}

impl ServerMessage {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
