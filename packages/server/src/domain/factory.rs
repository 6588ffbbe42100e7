//! Domain factories for creating domain entities and value objects.

use rand::{RngCore, rngs::OsRng};

use super::value_object::{ROOM_ID_ENTROPY_BYTES, RoomId};

/// Factory for generating RoomId instances.
///
/// This factory encapsulates the logic for generating new room identifiers,
/// separating the generation concern from the validation logic in RoomId.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a new unguessable RoomId from the operating system's CSPRNG.
    pub fn generate() -> RoomId {
        let mut bytes = [0u8; ROOM_ID_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        RoomId::from_bytes(&bytes)
    }
}
