//! Protocol codec: inbound text frames to [`ClientMessage`], [`ServerMessage`] to frames.

use serde_json::{Map, Value};
use thiserror::Error;

use super::dto::websocket::{ClientMessage, ServerMessage};
use crate::domain::RoomId;

/// Default ceiling on inbound frame size, in bytes
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4096;

/// Why an inbound frame was rejected. The `Display` text is sent to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Message too large.")]
    TooLarge { max: usize, actual: usize },

    #[error("Invalid JSON.")]
    InvalidJson,

    #[error("Missing message type.")]
    MissingType,
}

/// Decode one text frame.
///
/// # Errors
///
/// Frames over `max_bytes` are rejected before parsing.
pub fn decode(frame: &str, max_bytes: usize) -> Result<ClientMessage, DecodeError> {
    if frame.len() > max_bytes {
        return Err(DecodeError::TooLarge {
            max: max_bytes,
            actual: frame.len(),
        });
    }

    let value: Value = serde_json::from_str(frame).map_err(|_| DecodeError::InvalidJson)?;
    let Value::Object(fields) = value else {
        return Err(DecodeError::MissingType);
    };
    let message_type = fields.get("type").ok_or(DecodeError::MissingType)?;

    let message = match message_type.as_str() {
        Some("create_room") => ClientMessage::CreateRoom,
        Some("join_room") => ClientMessage::JoinRoom {
            room_id: room_id_field(&fields),
        },
        Some("set_secret") => ClientMessage::SetSecret {
            secret: fields.get("secret").and_then(int_like),
        },
        Some("guess") => ClientMessage::Guess {
            guess: fields.get("guess").and_then(int_like),
        },
        Some(other) => ClientMessage::Other {
            message_type: other.to_string(),
        },
        None => ClientMessage::Other {
            message_type: message_type.to_string(),
        },
    };
    Ok(message)
}

/// Serialize an outbound message to a text frame.
pub fn encode(message: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// A native integer or a string of ASCII digits. Booleans and floats are rejected.
pub fn int_like(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.parse().ok()
        }
        _ => None,
    }
}

fn room_id_field(fields: &Map<String, Value>) -> Option<RoomId> {
    match fields.get("room_id") {
        Some(Value::String(id)) => RoomId::new(id.clone()).ok(),
        _ => None,
    }
}
